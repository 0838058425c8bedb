use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Which preview component a render targets.
///
/// Tokens render as a wrapper element carrying the token marker class with an
/// icon-like SVG embedded inside; icons render as a bare SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Icon,
    Token,
}

impl ComponentKind {
    /// Parse a wire value. Anything but the two exact names is rejected;
    /// callers surface that as a client error, never a silent default.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "icon" => Some(ComponentKind::Icon),
            "token" => Some(ComponentKind::Token),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Icon => write!(f, "icon"),
            ComponentKind::Token => write!(f, "token"),
        }
    }
}

/// Size vocabulary shared by the preview page and the static renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SizeToken {
    S,
    M,
    L,
    Xl,
}

impl SizeToken {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "s" => Some(SizeToken::S),
            "m" => Some(SizeToken::M),
            "l" => Some(SizeToken::L),
            "xl" => Some(SizeToken::Xl),
            _ => None,
        }
    }

    /// Pixel edge length the preview page applies for this token.
    pub fn px(self) -> u32 {
        match self {
            SizeToken::S => 16,
            SizeToken::M => 24,
            SizeToken::L => 32,
            SizeToken::Xl => 48,
        }
    }
}

impl fmt::Display for SizeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeToken::S => write!(f, "s"),
            SizeToken::M => write!(f, "m"),
            SizeToken::L => write!(f, "l"),
            SizeToken::Xl => write!(f, "xl"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_kind_parse() {
        assert_eq!(ComponentKind::parse("icon"), Some(ComponentKind::Icon));
        assert_eq!(ComponentKind::parse("token"), Some(ComponentKind::Token));
        assert_eq!(ComponentKind::parse("badge"), None);
        assert_eq!(ComponentKind::parse(""), None);
        // Exact match only - no case folding on the wire
        assert_eq!(ComponentKind::parse("Icon"), None);
    }

    #[test]
    fn test_component_kind_display_roundtrip() {
        for kind in [ComponentKind::Icon, ComponentKind::Token] {
            assert_eq!(ComponentKind::parse(&kind.to_string()), Some(kind));
        }
    }

    #[test]
    fn test_size_token_parse() {
        assert_eq!(SizeToken::parse("s"), Some(SizeToken::S));
        assert_eq!(SizeToken::parse("xl"), Some(SizeToken::Xl));
        assert_eq!(SizeToken::parse("xxl"), None);
        assert_eq!(SizeToken::parse(""), None);
    }

    #[test]
    fn test_size_token_px() {
        assert_eq!(SizeToken::S.px(), 16);
        assert_eq!(SizeToken::M.px(), 24);
        assert_eq!(SizeToken::L.px(), 32);
        assert_eq!(SizeToken::Xl.px(), 48);
    }

    #[test]
    fn test_serde_wire_names() {
        assert_eq!(
            serde_json::to_string(&ComponentKind::Token).unwrap(),
            "\"token\""
        );
        assert_eq!(serde_json::to_string(&SizeToken::Xl).unwrap(), "\"xl\"");
        let kind: ComponentKind = serde_json::from_str("\"icon\"").unwrap();
        assert_eq!(kind, ComponentKind::Icon);
    }
}
