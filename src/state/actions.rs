//! One remote call plus its reconciliation into the [`PostList`].
//!
//! Every function here awaits the request first and only then touches the list, so
//! the collection never reflects a mutation the server has not confirmed.

use super::{ListStore, PostList};
use crate::api::{ApiError, PostsApi};
use crate::confirm::PendingAction;
use crate::editor::{EditorIntent, ValidationErrors};
use crate::models::Post;

#[derive(Clone, Debug, thiserror::Error)]
pub(crate) enum ActionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("The server refused to delete post #{0}.")]
    Rejected(u64),

    #[error("Post #{0} already has a change in progress.")]
    Busy(u64),

    #[error("{0}")]
    Invalid(ValidationErrors),
}

/// Outcome of submitting the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Submitted {
    Created(Post),
    /// Edits go through the confirmation gate before they are sent.
    NeedsConfirm(PendingAction),
}

fn report<S: ListStore>(store: &S, e: &ActionError) {
    store.with_list(|l| l.last_error = Some(e.to_string()));
}

pub(crate) async fn refresh<A, S>(api: &A, store: &S) -> Result<usize, ActionError>
where
    A: PostsApi + ?Sized,
    S: ListStore,
{
    store.with_list(PostList::begin_refresh);

    let result = api.list_posts().await;
    let outcome = match &result {
        Ok(posts) => {
            log::info!("loaded {} posts", posts.len());
            Ok(posts.len())
        }
        Err(e) => {
            log::error!("list posts failed: {e}");
            Err(ActionError::from(e.clone()))
        }
    };

    store.with_list(|l| l.finish_refresh(result));
    outcome
}

/// Sends a validated editor result. Validation failures never reach the network.
pub(crate) async fn submit_editor<A, S>(
    api: &A,
    store: &S,
    submitted: Result<EditorIntent, ValidationErrors>,
) -> Result<Submitted, ActionError>
where
    A: PostsApi + ?Sized,
    S: ListStore,
{
    match submitted.map_err(ActionError::Invalid)? {
        EditorIntent::Create(draft) => match api.create_post(&draft).await {
            Ok(post) => {
                log::info!("created post #{}", post.id);
                store.with_list(|l| l.add(post.clone()));
                Ok(Submitted::Created(post))
            }
            Err(e) => {
                log::error!("create post failed: {e}");
                let e = ActionError::from(e);
                report(store, &e);
                Err(e)
            }
        },
        EditorIntent::Update(post) => Ok(Submitted::NeedsConfirm(PendingAction::Update(post))),
    }
}

pub(crate) async fn update<A, S>(api: &A, store: &S, post: Post) -> Result<Post, ActionError>
where
    A: PostsApi + ?Sized,
    S: ListStore,
{
    let id = post.id;
    if !store.with_list(|l| l.try_begin(id)).unwrap_or(false) {
        log::warn!("update of post #{id} ignored, one is already in flight");
        return Err(ActionError::Busy(id));
    }

    let result = api.update_post(id, &post.draft()).await;
    store.with_list(|l| l.end(id));

    match result {
        Ok(saved) => {
            let saved = Post {
                id,
                user_id: saved.user_id.or(post.user_id),
                ..saved
            };
            log::info!("updated post #{id}");
            store.with_list(|l| l.replace(saved.clone()));
            Ok(saved)
        }
        Err(e) => {
            log::error!("update post #{id} failed: {e}");
            let e = ActionError::from(e);
            report(store, &e);
            Err(e)
        }
    }
}

pub(crate) async fn delete<A, S>(api: &A, store: &S, id: u64) -> Result<(), ActionError>
where
    A: PostsApi + ?Sized,
    S: ListStore,
{
    if !store.with_list(|l| l.try_begin(id)).unwrap_or(false) {
        log::warn!("delete of post #{id} ignored, one is already in flight");
        return Err(ActionError::Busy(id));
    }

    let result = api.delete_post(id).await;
    store.with_list(|l| l.end(id));

    let err = match result {
        Ok(true) => {
            log::info!("deleted post #{id}");
            store.with_list(|l| l.remove(id));
            return Ok(());
        }
        Ok(false) => ActionError::Rejected(id),
        Err(e) => ActionError::from(e),
    };

    log::error!("delete post #{id} failed: {err}");
    report(store, &err);
    Err(err)
}

pub(crate) async fn select_for_comments<A, S>(
    api: &A,
    store: &S,
    post_id: u64,
) -> Result<(), ActionError>
where
    A: PostsApi + ?Sized,
    S: ListStore,
{
    store.with_list(|l| l.begin_comments(post_id));

    let result = api.list_comments(post_id).await;
    let outcome = result.as_ref().map(|_| ()).map_err(|e| {
        log::error!("comments for post #{post_id} failed: {e}");
        ActionError::from(e.clone())
    });

    let applied = store
        .with_list(|l| l.finish_comments(post_id, result))
        .unwrap_or(false);
    if !applied {
        log::debug!("dropped stale comments for post #{post_id}");
    }
    outcome
}

/// Runs whatever the confirmation gate released.
pub(crate) async fn dispatch_confirmed<A, S>(
    api: &A,
    store: &S,
    action: PendingAction,
) -> Result<(), ActionError>
where
    A: PostsApi + ?Sized,
    S: ListStore,
{
    match action {
        PendingAction::Delete { id, .. } => delete(api, store, id).await,
        PendingAction::Update(post) => update(api, store, post).await.map(|_| ()),
    }
}
