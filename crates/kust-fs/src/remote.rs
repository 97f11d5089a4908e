//! Remote git bases
//!
//! A base may name a git repository instead of a local directory:
//!
//! ```text
//! github.com/org/repo//deploy/base?ref=v1.2.0
//! https://git.example.com/team/config.git//overlays/shared
//! git@github.com:org/repo//base
//! ```
//!
//! Everything after `//` (past the scheme) is a subdirectory of the checkout,
//! and `?ref=` selects a branch, tag or commit to check out detached.

use crate::{Error, NormalizedPath, Result};
use git2::Repository;
use git2::build::CheckoutBuilder;
use tempfile::TempDir;

const REMOTE_PREFIXES: [&str; 6] = [
    "https://",
    "http://",
    "ssh://",
    "git@",
    "git::",
    "github.com/",
];

/// True when a location should be fetched with git rather than read locally.
pub fn is_remote(location: &str) -> bool {
    REMOTE_PREFIXES
        .iter()
        .any(|prefix| location.starts_with(prefix))
}

/// A parsed remote base location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSpec {
    /// URL handed to git
    pub url: String,
    /// Directory inside the checkout holding the kustomization
    pub subdir: Option<String>,
    /// Branch, tag or commit to check out
    pub reference: Option<String>,
}

impl RemoteSpec {
    /// Parse a remote location.
    pub fn parse(location: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidRemote {
            location: location.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = location.strip_prefix("git::").unwrap_or(location);
        let (base, query) = match trimmed.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (trimmed, None),
        };

        let reference = query
            .into_iter()
            .flat_map(|q| q.split('&'))
            .find_map(|pair| pair.strip_prefix("ref="))
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        let search_from = base.find("://").map(|idx| idx + 3).unwrap_or(0);
        let (url, subdir) = match base[search_from..].find("//") {
            Some(idx) => {
                let split = search_from + idx;
                let subdir = base[split + 2..].trim_matches('/');
                (
                    &base[..split],
                    (!subdir.is_empty()).then(|| subdir.to_string()),
                )
            }
            None => (base, None),
        };

        if url.is_empty() || url.ends_with("://") {
            return Err(invalid("missing repository URL"));
        }

        let url = if url.starts_with("github.com/") {
            format!("https://{url}")
        } else {
            url.to_string()
        };

        Ok(Self {
            url,
            subdir,
            reference,
        })
    }
}

/// A temporary clone of a remote base, deleted when dropped.
pub(crate) struct RemoteCheckout {
    dir: TempDir,
}

impl std::fmt::Debug for RemoteCheckout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCheckout")
            .field("dir", &self.dir.path())
            .finish()
    }
}

impl Drop for RemoteCheckout {
    fn drop(&mut self) {
        tracing::debug!(path = ?self.dir.path(), "Removing remote checkout");
    }
}

/// Clone `spec` into a fresh temporary directory.
///
/// Returns the checkout guard and the root the loader should use.
pub(crate) fn checkout(spec: &RemoteSpec) -> Result<(RemoteCheckout, NormalizedPath)> {
    let dir = tempfile::Builder::new()
        .prefix("kust-remote-")
        .tempdir()
        .map_err(|e| Error::io(std::env::temp_dir(), e))?;

    tracing::debug!(url = %spec.url, path = ?dir.path(), "Cloning remote base");
    let git_error = |source: git2::Error| Error::Git {
        url: spec.url.clone(),
        source,
    };

    {
        let repo = Repository::clone(&spec.url, dir.path()).map_err(git_error)?;
        if let Some(reference) = &spec.reference {
            let object = repo
                .revparse_single(reference)
                .or_else(|_| repo.revparse_single(&format!("origin/{reference}")))
                .map_err(git_error)?;
            let mut checkout = CheckoutBuilder::new();
            checkout.force();
            repo.checkout_tree(&object, Some(&mut checkout))
                .map_err(git_error)?;
            repo.set_head_detached(object.id()).map_err(git_error)?;
        }
    }

    let checkout_root = dunce::canonicalize(dir.path()).map_err(|e| Error::io(dir.path(), e))?;
    let mut root = NormalizedPath::new(checkout_root);
    if let Some(subdir) = &spec.subdir {
        root = root.join(subdir).clean();
    }

    Ok((RemoteCheckout { dir }, root))
}
