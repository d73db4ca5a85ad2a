// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Built-in normalization rules, in pipeline order.
mod cluster;
mod collapse;
mod merge;
mod split;

pub use cluster::AssignClusterIds;
pub use collapse::CollapseLinearRuns;
pub use merge::MergeCoincidentVertices;
pub use split::SplitEdgesAtPassingVertices;
