/*
 * 5D Labs Platform - Metrics Operator
 * Copyright (C) 2025 5D Labs
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::doc_markdown)]

//! Metrics operator core library
//!
//! This crate provides the reconciliation tasks that keep the cluster's
//! metrics-server component converged to its desired state, including the
//! manifest factory, the Kubernetes client wrapper and the task runner.

pub mod client;
pub mod config;
pub mod manifests;
pub mod tasks;

// Re-export commonly used types
pub use client::{ClientError, KubeResourceClient, ResourceClient};
pub use config::OperatorConfig;
pub use manifests::{Desired, DesiredObject, Factory, ManifestFactory, ManifestKind, ResourceKind};
pub use tasks::{MetricsServerTask, Task, TaskRunner};
pub use tasks::types::{Error, Result};
