use crate::directory::{Directory, DirectoryError};
use crate::menu_cache::{MenuCache, menu_tag};
use crate::session::resolve_session;
use serde::Serialize;

/// Outcome of a revalidation request.
///
/// Skips are explicit variants rather than silent early returns so callers
/// and tests can tell "nothing happened" apart from "invalidated".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RevalidateOutcome {
    Invalidated { tag: String },
    SkippedNoSession,
    SkippedNoSlug,
}

/// Invalidates every cached artifact of the authenticated tenant's public
/// menu.
///
/// The tag is derived only from the caller's own slug, so one tenant can
/// never invalidate another's artifacts. Unauthenticated callers and tenants
/// without a public slug trigger nothing.
pub async fn revalidate_tenant_menu(
    directory: &dyn Directory,
    cache: &MenuCache,
    token: Option<&str>,
) -> Result<RevalidateOutcome, DirectoryError> {
    let Some(user) = resolve_session(directory, token).await? else {
        return Ok(RevalidateOutcome::SkippedNoSession);
    };

    let slug = directory
        .settings_for_user(&user.id)
        .await?
        .and_then(|settings| settings.public_slug)
        .filter(|slug| !slug.is_empty());

    let Some(slug) = slug else {
        return Ok(RevalidateOutcome::SkippedNoSlug);
    };

    let tag = menu_tag(&slug);
    cache.invalidate(&tag);
    tracing::info!(%tag, user_id = %user.id, "revalidated tenant menu");
    Ok(RevalidateOutcome::Invalidated { tag })
}
