//! Unit of deletion work

use anyhow::Result;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type DeleteFn = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// One discovered resource together with the action that deletes it.
///
/// The delete action owns whatever client it needs and can be invoked more
/// than once; deleting an already-deleted resource succeeds.
#[derive(Clone)]
pub struct Sweepable {
    kind: &'static str,
    id: String,
    delete: DeleteFn,
}

impl Sweepable {
    pub fn new<F, Fut>(kind: &'static str, id: impl Into<String>, delete: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            kind,
            id: id.into(),
            delete: Arc::new(move || delete().boxed()),
        }
    }

    /// Display name of the resource kind
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Opaque identifier, unique within the kind
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn delete(&self) -> BoxFuture<'static, Result<()>> {
        (self.delete)()
    }
}

impl fmt::Debug for Sweepable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sweepable")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Sweepable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.id)
    }
}
