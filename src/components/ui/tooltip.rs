use leptos::prelude::*;
use tw_merge::tw_merge;

#[derive(Clone, Copy, Default, strum::Display, strum::AsRefStr)]
pub enum TooltipPosition {
    #[default]
    Top,
    Bottom,
}

/// Hover/focus tooltip, pure CSS via Tailwind's `group-hover`.
#[component]
pub fn Tooltip(
    #[prop(into)] text: String,
    #[prop(default = TooltipPosition::default())] position: TooltipPosition,
    children: Children,
) -> impl IntoView {
    let position_class = match position {
        TooltipPosition::Top => "left-1/2 bottom-full mb-1.5 -translate-x-1/2",
        TooltipPosition::Bottom => "left-1/2 top-full mt-1.5 -translate-x-1/2",
    };

    let content_class = tw_merge!(
        "absolute z-50 opacity-0 pointer-events-none transition-opacity duration-200 group-hover/tooltip:opacity-100 group-focus-within/tooltip:opacity-100",
        "rounded-md py-1.5 px-2.5 text-xs whitespace-nowrap shadow-lg text-background bg-foreground/90",
        position_class,
    );

    view! {
        <span data-name="Tooltip" class="relative inline-flex group/tooltip">
            {children()}
            <span
                data-name="TooltipContent"
                data-position=position.as_ref().to_string()
                role="tooltip"
                class=content_class
            >
                {text}
            </span>
        </span>
    }
}
