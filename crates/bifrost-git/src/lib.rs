// Git-Bifrost - Large File Transport for Git
// Copyright (C) 2026 Bifrost Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! # Git integration layer for git-bifrost
//!
//! Everything that touches git history lives here:
//!
//! - **Proxy codec** ([`proxy`]): the four-line surrogate committed in place
//!   of a large blob, addressed by its SHA-1 digest.
//! - **Plumbing adapter** ([`git`]): subprocess wrappers over `rev-list`,
//!   `diff-tree -z`, `cat-file`, `check-attr -z` and `config`.
//! - **Filter driver** ([`filter`]): the clean (blob to proxy) and smudge
//!   (proxy to blob) transforms git pipes worktree content through.
//! - **Hooks** ([`precommit`], [`prepush`]): the guard that refuses oversize
//!   unfiltered blobs and mis-staged proxies, and the orchestrator that
//!   replicates outgoing blobs to the destination remote's stores.
//! - **Verify sweep** ([`verify`]): audits a store against every proxy
//!   reachable in history.
//!
//! ## Proxy format
//!
//! ```text
//! ~*@git-bifrost@*~
//! 1
//! 2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED
//! 11
//! ```

pub mod error;
pub mod filter;
pub mod git;
pub mod precommit;
pub mod prepush;
pub mod proxy;
pub mod verify;

pub use error::{GitError, GitResult};
pub use filter::FilterDriver;
pub use git::{ChangedEntry, Git, ZERO_SHA};
pub use precommit::{FlaggedFile, Offence, PrecommitGuard, PrecommitReport, FILTER_NAME};
pub use prepush::{parse_push_records, PrePushOrchestrator, PushRecord, PushSummary};
pub use proxy::{digest_hex, ProxyFile, PROXY_VERSION, SENTINEL};
pub use verify::{ObjectHealth, VerifyOptions, VerifyReport, VerifySweep};
