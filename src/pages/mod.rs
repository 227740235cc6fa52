use crate::api::ApiClient;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardFooter, CardGrid, CardHeader, CardItem, CardTitle, Input, Label,
    Spinner, Textarea, Tooltip, TooltipPosition,
};
use crate::confirm::PendingAction;
use crate::models::Post;
use crate::state::actions::{self, Submitted};
use crate::state::{AppContext, AppState, PostList};
use crate::theme::apply_theme;
use crate::view::{PageView, SortKey};
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use std::str::FromStr;

fn app_state() -> AppState {
    expect_context::<AppContext>().0
}

fn api(app: &AppState) -> ApiClient {
    app.api_client.get_value()
}

#[component]
pub fn PostsPage() -> impl IntoView {
    let app = app_state();
    let list = app.list;

    let page: Memo<PageView> = Memo::new(move |_| list.with(PostList::page_view));
    let ready = move || list.with(|l| l.is_ready());

    // Populate once on mount.
    Effect::new(move |_| {
        let api = api(&app);
        spawn_local(async move {
            if let Err(e) = actions::refresh(&api, &list).await {
                log::debug!("initial load failed: {e}");
            }
        });
    });

    Effect::new(move |_| apply_theme(app.theme.get()));

    let on_new = move |_| {
        app.editor.update(|e| e.open_new());
        app.editor_open.set(true);
    };

    view! {
        <div class="min-h-screen bg-background text-foreground">
            <div class="mx-auto w-full max-w-[1080px] px-4 py-8">
                <div class="mb-4 flex items-center justify-between">
                    <div class="space-y-1">
                        <h1 class="text-xl font-semibold">"Posts"</h1>
                        <p class="text-xs text-muted-foreground">
                            {move || format!("{} matching", page.get().total)}
                        </p>
                    </div>

                    <div class="flex items-center gap-2">
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=move |_| app.theme.update(|t| *t = t.toggled())
                        >
                            {move || app.theme.get().toggle_label()}
                        </Button>
                        <Button size=ButtonSize::Sm on:click=on_new>"New post"</Button>
                    </div>
                </div>

                <ErrorBanner />
                <Toolbar />

                <Show when=move || app.editor_open.get() fallback=|| ().into_view()>
                    <PostEditorPanel />
                </Show>

                <Show
                    when=ready
                    fallback=|| view! {
                        <div class="flex justify-center py-10">
                            <Spinner class="size-8" />
                        </div>
                    }
                >
                    <Show
                        when=move || page.with(|p| !p.items.is_empty())
                        fallback=|| view! {
                            <div class="py-10 text-center text-xs text-muted-foreground">"No posts match."</div>
                        }
                    >
                        <CardGrid>
                            {move || {
                                page.get()
                                    .items
                                    .into_iter()
                                    .map(|post| view! { <PostCard post=post /> })
                                    .collect_view()
                            }}
                        </CardGrid>
                    </Show>
                    <Pagination page=page />
                </Show>

                <CommentsPanel />
                <ConfirmDialog />
            </div>
        </div>
    }
}

#[component]
fn ErrorBanner() -> impl IntoView {
    let list = app_state().list;
    let error = move || list.with(|l| l.last_error.clone());

    view! {
        <Show when=move || error().is_some() fallback=|| ().into_view()>
            <Alert class="mb-4 border-destructive/30">
                <AlertDescription class="text-destructive">{error}</AlertDescription>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    on:click=move |_| list.update(|l| l.dismiss_error())
                >
                    "Dismiss"
                </Button>
            </Alert>
        </Show>
    }
}

#[component]
fn Toolbar() -> impl IntoView {
    let list = app_state().list;

    let search = Signal::derive(move || list.with(|l| l.view.search.clone()));
    let on_search = Callback::new(move |q: String| list.update(|l| l.set_search(q)));

    let on_sort = move |ev: ev::Event| match SortKey::from_str(&event_target_value(&ev)) {
        Ok(key) => list.update(|l| l.set_sort(key)),
        Err(e) => log::warn!("unknown sort key: {e}"),
    };

    view! {
        <div class="mb-4 flex flex-col gap-3 sm:flex-row sm:items-center">
            <Input
                class="sm:max-w-xs"
                r#type="search"
                placeholder="Search posts…"
                aria_label="Search posts"
                value=search
                on_input=on_search
            />

            <label class="flex items-center gap-2 text-xs text-muted-foreground">
                <input
                    type="checkbox"
                    prop:checked=move || list.with(|l| l.view.search_body)
                    on:change=move |ev| list.update(|l| l.set_search_body(event_target_checked(&ev)))
                />
                "Search body too"
            </label>

            <select
                class="h-9 rounded-md border border-input bg-transparent px-2 text-sm sm:ml-auto"
                aria-label="Sort posts"
                prop:value=move || list.with(|l| l.view.sort.to_string())
                on:change=on_sort
            >
                {SortKey::all()
                    .into_iter()
                    .map(|key| view! { <option value=key.to_string()>{key.label()}</option> })
                    .collect_view()}
            </select>
        </div>
    }
}

#[component]
fn PostCard(post: Post) -> impl IntoView {
    let app = app_state();
    let list = app.list;
    let id = post.id;

    let busy = move || list.with(|l| l.is_busy(id));
    let selected = move || list.with(|l| l.view.selected == Some(id));

    let on_comments = move |_| {
        if selected() {
            list.update(|l| l.clear_selection());
            return;
        }
        let api = api(&app);
        spawn_local(async move {
            if let Err(e) = actions::select_for_comments(&api, &list, id).await {
                log::debug!("comments for post #{id} failed: {e}");
            }
        });
    };

    let on_edit = move |_| {
        let Some(post) = list.with_untracked(|l| l.get(id).cloned()) else {
            return;
        };
        app.editor.update(|e| e.open_edit(&post));
        app.editor_open.set(true);
    };

    let title_for_delete = post.title.clone();
    let on_delete = move |_| {
        app.gate.update(|g| {
            g.open(PendingAction::Delete {
                id,
                title: title_for_delete.clone(),
            })
        });
    };

    view! {
        <CardItem attr:data-post-id=id.to_string()>
            <div class="flex items-start justify-between gap-2">
                <h3 class="text-sm font-semibold leading-snug">{post.title}</h3>
                <span class="text-xs text-muted-foreground">{format!("#{id}")}</span>
            </div>
            <p class="line-clamp-3 text-xs text-muted-foreground">{post.body}</p>

            <div class="mt-auto flex items-center gap-1 pt-2">
                <Tooltip text="Show comments" position=TooltipPosition::Bottom>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        attr:aria-pressed=move || selected().to_string()
                        on:click=on_comments
                    >
                        {move || if selected() { "Hide comments" } else { "Comments" }}
                    </Button>
                </Tooltip>
                <Tooltip text="Edit this post" position=TooltipPosition::Bottom>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=busy
                        on:click=on_edit
                    >
                        "Edit"
                    </Button>
                </Tooltip>
                <Tooltip text="Delete this post" position=TooltipPosition::Bottom>
                    <Button
                        variant=ButtonVariant::Destructive
                        size=ButtonSize::Sm
                        attr:disabled=busy
                        on:click=on_delete
                    >
                        <Show when=busy fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        "Delete"
                    </Button>
                </Tooltip>
            </div>
        </CardItem>
    }
}

#[component]
fn PostEditorPanel() -> impl IntoView {
    let app = app_state();
    let editor = app.editor;
    let saving: RwSignal<bool> = RwSignal::new(false);

    let title = Signal::derive(move || editor.with(|e| e.title.clone()));
    let body = Signal::derive(move || editor.with(|e| e.body.clone()));
    let title_error = move || editor.with(|e| e.errors.title.clone());
    let body_error = move || editor.with(|e| e.errors.body.clone());

    let close = move || {
        if editor.try_update(|e| e.cancel()).unwrap_or(true) {
            app.editor_open.set(false);
        }
    };

    let on_save = move |_| {
        if saving.get_untracked() {
            return;
        }
        let Some(submitted) = editor.try_update(|e| e.submit()) else {
            return;
        };
        // Validation errors are already on the editor; nothing to send.
        if submitted.is_err() {
            return;
        }

        let api = api(&app);
        let list = app.list;
        saving.set(true);
        spawn_local(async move {
            match actions::submit_editor(&api, &list, submitted).await {
                Ok(Submitted::Created(_)) => close(),
                Ok(Submitted::NeedsConfirm(action)) => app.gate.update(|g| g.open(action)),
                Err(e) => log::debug!("submit failed: {e}"),
            }
            saving.set(false);
        });
    };

    view! {
        <Card class="mb-6">
            <CardHeader>
                <CardTitle>
                    {move || match editor.with(|e| e.editing_id()) {
                        Some(id) => format!("Edit post #{id}"),
                        None => "Create a new post".to_string(),
                    }}
                </CardTitle>
                <CardDescription>"Title and body are required."</CardDescription>
            </CardHeader>

            <CardContent>
                <div class="flex flex-col gap-4">
                    <div class="flex flex-col gap-2">
                        <Label html_for="post-title">"Title"</Label>
                        <Input
                            id="post-title"
                            value=title
                            on_input=Callback::new(move |v: String| editor.update(|e| e.title = v))
                            invalid=Signal::derive(move || title_error().is_some())
                        />
                        {move || title_error().map(|msg| view! {
                            <p class="text-xs text-destructive">{msg}</p>
                        })}
                    </div>

                    <div class="flex flex-col gap-2">
                        <Label html_for="post-body">"Body"</Label>
                        <Textarea
                            id="post-body"
                            value=body
                            on_input=Callback::new(move |v: String| editor.update(|e| e.body = v))
                            invalid=Signal::derive(move || body_error().is_some())
                        />
                        {move || body_error().map(|msg| view! {
                            <p class="text-xs text-destructive">{msg}</p>
                        })}
                    </div>
                </div>
            </CardContent>

            <CardFooter class="justify-end">
                <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=move |_| close()>
                    "Cancel"
                </Button>
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    on:click=move |_| editor.update(|e| e.clear())
                >
                    "Clear"
                </Button>
                <Button size=ButtonSize::Sm attr:disabled=move || saving.get() on:click=on_save>
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || saving.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || match (saving.get(), editor.with(|e| e.is_editing())) {
                            (true, _) => "Saving...",
                            (false, true) => "Save changes",
                            (false, false) => "Create post",
                        }}
                    </span>
                </Button>
            </CardFooter>
        </Card>
    }
}

#[component]
fn Pagination(page: Memo<PageView>) -> impl IntoView {
    let list = app_state().list;
    let go = move |n: usize| list.update(|l| l.set_page(n));

    view! {
        <Show when=move || page.with(|p| p.page_count > 1) fallback=|| ().into_view()>
            <nav class="mt-6 flex items-center justify-center gap-1" aria-label="Pagination">
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    attr:disabled=move || !page.with(|p| p.has_prev())
                    on:click=move |_| go(page.with_untracked(|p| p.page.saturating_sub(1)))
                >
                    "Previous"
                </Button>

                {move || {
                    let current = page.with(|p| p.page);
                    page.with(|p| p.window.clone())
                        .map(|n| {
                            let variant = if n == current {
                                ButtonVariant::Default
                            } else {
                                ButtonVariant::Ghost
                            };
                            view! {
                                <Button
                                    variant=variant
                                    size=ButtonSize::Icon
                                    attr:aria-current=(n == current).then_some("page")
                                    on:click=move |_| go(n)
                                >
                                    {n.to_string()}
                                </Button>
                            }
                        })
                        .collect_view()
                }}

                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    attr:disabled=move || !page.with(|p| p.has_next())
                    on:click=move |_| go(page.with_untracked(|p| p.page + 1))
                >
                    "Next"
                </Button>
            </nav>
        </Show>
    }
}

#[component]
fn CommentsPanel() -> impl IntoView {
    let list = app_state().list;
    let state = move || list.with(|l| l.comments.clone());

    view! {
        {move || state().map(|c| {
            let heading = list
                .with_untracked(|l| l.get(c.post_id).map(|p| p.title.clone()))
                .unwrap_or_else(|| format!("Post #{}", c.post_id));
            let count = c.comments.len();

            view! {
                <Card class="mt-6">
                    <CardHeader>
                        <CardTitle>{format!("Comments on \"{heading}\"")}</CardTitle>
                        <CardDescription>
                            {if c.loading {
                                "Loading…".to_string()
                            } else {
                                format!("{count} comments")
                            }}
                        </CardDescription>
                    </CardHeader>
                    <CardContent>
                        <ul class="flex flex-col gap-3">
                            {c.comments
                                .into_iter()
                                .map(|comment| view! {
                                    <li class="rounded-md border px-3 py-2">
                                        <div class="text-sm font-medium">{comment.name}</div>
                                        <div class="text-xs text-muted-foreground">{comment.email}</div>
                                        <p class="mt-1 text-xs">{comment.body}</p>
                                    </li>
                                })
                                .collect_view()}
                        </ul>
                    </CardContent>
                    <CardFooter class="justify-end">
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=move |_| list.update(|l| l.clear_selection())
                        >
                            "Close"
                        </Button>
                    </CardFooter>
                </Card>
            }
        })}
    }
}

#[component]
fn ConfirmDialog() -> impl IntoView {
    let app = app_state();
    let gate = app.gate;
    let pending = move || gate.with(|g| g.pending().cloned());

    let handle = window_event_listener(ev::keydown, move |e: web_sys::KeyboardEvent| {
        if e.key() == "Escape" && gate.with_untracked(|g| g.is_open()) {
            gate.update(|g| g.dismiss());
        }
    });
    on_cleanup(move || handle.remove());

    let on_confirm = move |_| {
        let Some(action) = gate.try_update(|g| g.confirm()).flatten() else {
            return;
        };
        let is_update = !action.is_destructive();
        let post_id = action.post_id();
        let api = api(&app);
        let list = app.list;

        spawn_local(async move {
            match actions::dispatch_confirmed(&api, &list, action).await {
                Ok(()) if is_update => {
                    app.editor.update(|e| {
                        e.cancel();
                    });
                    app.editor_open.set(false);
                }
                Ok(()) => {
                    if app.editor.try_update(|e| e.release(post_id)).unwrap_or(false) {
                        app.editor_open.set(false);
                    }
                }
                Err(e) => log::debug!("confirmed action failed: {e}"),
            }
        });
    };

    view! {
        {move || pending().map(|action| {
            let destructive = action.is_destructive();
            let heading_class = if destructive {
                "text-sm font-medium text-destructive"
            } else {
                "text-sm font-medium"
            };
            let confirm_variant = if destructive {
                ButtonVariant::Destructive
            } else {
                ButtonVariant::Default
            };

            view! {
                <div
                    class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4"
                    on:click=move |_| gate.update(|g| g.dismiss())
                >
                    <div
                        role="dialog"
                        aria-modal="true"
                        class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg"
                        on:click=|ev| ev.stop_propagation()
                    >
                        <div class="mb-3 space-y-1">
                            <div class=heading_class>
                                {action.heading()}
                            </div>
                            <div class="text-xs text-muted-foreground">{action.description()}</div>
                        </div>

                        <div class="flex items-center justify-end gap-2 pt-2">
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                on:click=move |_| gate.update(|g| g.dismiss())
                            >
                                "Cancel"
                            </Button>
                            <Button
                                variant=confirm_variant
                                size=ButtonSize::Sm
                                on:click=on_confirm
                            >
                                {if destructive { "Delete" } else { "Save" }}
                            </Button>
                        </div>
                    </div>
                </div>
            }
        })}
    }
}
