pub mod batch;
pub mod health;
pub mod render;

pub use batch::{
    handle_render_icons, handle_render_markups, handle_render_tokens, IconBatchResult,
    MarkupBatchResult, RenderIconsResponse, RenderMarkupsResponse, RenderTokensResponse,
    TokenBatchResult, __path_handle_render_icons, __path_handle_render_markups,
    __path_handle_render_tokens,
};
pub use health::{handle_health, HealthResponse, __path_handle_health};
pub use render::{
    handle_render_icon, handle_render_markup, handle_render_svg, handle_render_token,
    RenderIconResponse, RenderMarkupResponse, RenderRequest, RenderSvgResponse,
    RenderTokenResponse, __path_handle_render_icon, __path_handle_render_markup,
    __path_handle_render_svg, __path_handle_render_token,
};
