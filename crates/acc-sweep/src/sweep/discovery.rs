//! Discovery of one resource kind in one region
//!
//! [`sweep_kind`] is the shared body of every sweeper:
//!
//! 1. region gate (no client, no listing when the kind cannot exist here)
//! 2. connect to the backend
//! 3. page through the listing, building a [`Sweepable`] per item
//! 4. classify listing errors: skip quietly or record
//! 5. hand everything found to the orchestrator
//!
//! Per-kind code only supplies the listing cursor and the item to
//! sweepable conversion through [`KindSweeper`].

use super::classify::{ListingErrorClass, classify_listing_error};
use super::context::SweepContext;
use super::cursor::PageCursor;
use super::errors::SweepErrors;
use super::sweepable::Sweepable;
use acc_sweep_common::ResourceKind;
use anyhow::{Context, Result};
use std::future::Future;
use tracing::{debug, info, warn};

/// Per-kind half of a sweeper
pub trait KindSweeper: Send + Sync {
    /// Backend handle the listing and delete actions use
    type Client: Send + Sync;
    /// One listed resource
    type Item: Send;

    fn kind(&self) -> &'static ResourceKind;

    /// Cursor over every resource of this kind visible to `client`.
    fn pages(&self, client: &Self::Client) -> impl PageCursor<Item = Self::Item>;

    /// Turn a listed item into a sweepable.
    ///
    /// Must not perform I/O. `Ok(None)` excludes the item on purpose; an
    /// error means its identifier could not be built.
    fn build(&self, client: &Self::Client, item: Self::Item) -> Result<Option<Sweepable>>;
}

/// Discover and delete every resource of one kind in `ctx.region()`.
///
/// Only returns after every discovered resource has been attempted. The
/// error, if any, carries every failure of this run.
pub async fn sweep_kind<S, C, Fut>(
    ctx: &SweepContext,
    sweeper: &S,
    connect: C,
) -> Result<(), SweepErrors>
where
    S: KindSweeper,
    C: FnOnce() -> Fut,
    Fut: Future<Output = Result<S::Client>>,
{
    let kind = sweeper.kind();
    let region = ctx.region();

    if !kind.is_eligible(region) {
        warn!(
            kind = %kind.name,
            region = %region,
            "Skipping {} sweep for region",
            kind.display_name
        );
        return Ok(());
    }

    let client = connect().await.context("getting client")?;

    let mut errors = SweepErrors::new();
    let mut sweepables = Vec::new();
    let mut pages = sweeper.pages(&client);

    while pages.has_more() {
        let items = match pages.next_page().await {
            Ok(items) => items,
            Err(e) => {
                match classify_listing_error(&e) {
                    ListingErrorClass::Skip => {
                        warn!(
                            kind = %kind.name,
                            region = %region,
                            error = %format!("{e:#}"),
                            "Skipping {} sweep",
                            kind.display_name
                        );
                    }
                    ListingErrorClass::Fatal => {
                        errors.push(e.context(format!(
                            "listing {} ({region})",
                            kind.display_name
                        )));
                    }
                }
                break;
            }
        };

        for item in items {
            match sweeper.build(&client, item) {
                Ok(Some(sweepable)) => sweepables.push(sweepable),
                Ok(None) => {}
                Err(e) => errors.push(e.context(format!(
                    "building {} identifier ({region})",
                    kind.display_name
                ))),
            }
        }
    }

    if sweepables.is_empty() {
        debug!(kind = %kind.name, region = %region, "No resources found");
    } else {
        info!(
            kind = %kind.name,
            region = %region,
            count = sweepables.len(),
            "Sweeping {}",
            kind.display_name
        );
    }

    if let Err(failures) = ctx.orchestrator().run(sweepables).await {
        errors.extend(failures);
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::{Page, RegionalClients, classify_aws_error};
    use crate::sweep::cursor::TokenCursor;
    use crate::sweep::orchestrator::{OrchestratorConfig, SweepOrchestrator};
    use acc_sweep_common::RegionPolicy;
    use futures::FutureExt;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const WIDGET: ResourceKind =
        ResourceKind::new("test_widget", "Test Widget", RegionPolicy::Only(&["us-west-2"]));

    /// Scripted listing shared between the sweeper and the assertions
    #[derive(Default)]
    struct Backend {
        pages: Mutex<VecDeque<Result<Page<String>>>>,
        list_calls: AtomicUsize,
        deleted: Mutex<Vec<String>>,
    }

    struct WidgetSweeper;

    impl KindSweeper for WidgetSweeper {
        type Client = Arc<Backend>;
        type Item = String;

        fn kind(&self) -> &'static ResourceKind {
            &WIDGET
        }

        fn pages(&self, client: &Arc<Backend>) -> impl PageCursor<Item = String> {
            let backend = client.clone();
            TokenCursor::new(move |_token| {
                backend.list_calls.fetch_add(1, Ordering::SeqCst);
                let page = backend
                    .pages
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Ok(Page::last(Vec::new())));
                async move { page }.boxed()
            })
        }

        fn build(&self, client: &Arc<Backend>, item: String) -> Result<Option<Sweepable>> {
            if item == "keep" {
                return Ok(None);
            }
            if item.is_empty() {
                anyhow::bail!("empty widget name");
            }
            let backend = client.clone();
            let name = item.clone();
            Ok(Some(Sweepable::new(WIDGET.display_name, item, move || {
                let backend = backend.clone();
                let name = name.clone();
                async move {
                    backend.deleted.lock().unwrap().push(name);
                    Ok(())
                }
            })))
        }
    }

    fn context(region: &str) -> SweepContext {
        SweepContext::new(
            region,
            SweepOrchestrator::new(OrchestratorConfig {
                min_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                ..OrchestratorConfig::default()
            }),
            Arc::new(RegionalClients::new(region, None)),
        )
    }

    fn backend(pages: Vec<Result<Page<String>>>) -> Arc<Backend> {
        Arc::new(Backend {
            pages: Mutex::new(pages.into()),
            ..Backend::default()
        })
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn ineligible_region_never_connects() {
        let connects = AtomicUsize::new(0);
        let result = sweep_kind(&context("us-east-1"), &WidgetSweeper, || async {
            connects.fetch_add(1, Ordering::SeqCst);
            Ok(backend(Vec::new()))
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn connect_failure_is_reported() {
        let errors = sweep_kind(&context("us-west-2"), &WidgetSweeper, || async {
            Err::<Arc<Backend>, _>(anyhow::anyhow!("no credentials"))
        })
        .await
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("getting client: no credentials"));
    }

    #[tokio::test]
    async fn two_pages_with_one_malformed_item() {
        let b = backend(vec![
            Ok(Page::new(names(&["a", "b", ""]), Some("t1".into()))),
            Ok(Page::last(names(&["c", "d"]))),
        ]);

        let errors = sweep_kind(&context("us-west-2"), &WidgetSweeper, || async {
            Ok(b.clone())
        })
        .await
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("empty widget name"));
        let mut deleted = b.deleted.lock().unwrap().clone();
        deleted.sort();
        assert_eq!(deleted, names(&["a", "b", "c", "d"]));
    }

    #[tokio::test]
    async fn excluded_items_are_not_swept() {
        let b = backend(vec![Ok(Page::last(names(&["keep", "x"])))]);
        let result =
            sweep_kind(&context("us-west-2"), &WidgetSweeper, || async { Ok(b.clone()) }).await;

        assert!(result.is_ok());
        assert_eq!(*b.deleted.lock().unwrap(), names(&["x"]));
    }

    #[tokio::test]
    async fn skip_error_still_sweeps_what_was_found() {
        let b = backend(vec![
            Ok(Page::new(names(&["a"]), Some("t1".into()))),
            Err(classify_aws_error(Some("UnsupportedOperation"), Some("nope")).into()),
        ]);

        let result =
            sweep_kind(&context("us-west-2"), &WidgetSweeper, || async { Ok(b.clone()) }).await;

        assert!(result.is_ok());
        assert_eq!(*b.deleted.lock().unwrap(), names(&["a"]));
        assert_eq!(b.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fatal_listing_error_is_recorded_with_region() {
        let b = backend(vec![Err(anyhow::anyhow!("InternalError: boom"))]);

        let errors = sweep_kind(&context("us-west-2"), &WidgetSweeper, || async {
            Ok(b.clone())
        })
        .await
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("listing Test Widget (us-west-2)"));
        assert_eq!(b.list_calls.load(Ordering::SeqCst), 1);
    }
}
