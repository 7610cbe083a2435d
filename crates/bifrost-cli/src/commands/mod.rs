// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Command modules for the git-bifrost CLI

pub mod clone;
pub mod filter;
pub mod init;
pub mod pre_commit;
pub mod pre_push;
pub mod verify;

pub use clone::CloneCmd;
pub use filter::{FilterCleanCmd, FilterSmudgeCmd};
pub use init::InitCmd;
pub use pre_commit::HookPreCommitCmd;
pub use pre_push::HookPrePushCmd;
pub use verify::VerifyCmd;
