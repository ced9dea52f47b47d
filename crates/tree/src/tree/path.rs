use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;
use thiserror::Error;

/// Child-index path from a tree root, e.g. `/0/2/1`. The root itself is `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(SmallVec<[u32; 16]>);

impl NodePath {
	pub fn root() -> Self {
		Self::default()
	}

	pub fn from_indices(indices: impl IntoIterator<Item = u32>) -> Self {
		Self(indices.into_iter().collect())
	}

	pub fn indices(&self) -> &[u32] {
		&self.0
	}

	pub fn depth(&self) -> usize {
		self.0.len()
	}

	pub fn is_root(&self) -> bool {
		self.0.is_empty()
	}

	pub fn parent(&self) -> Option<NodePath> {
		let (_, init) = self.0.split_last()?;
		Some(Self(init.iter().copied().collect()))
	}

	pub fn child(&self, index: u32) -> NodePath {
		let mut next = self.clone();
		next.0.push(index);
		next
	}
}

impl fmt::Display for NodePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.0.is_empty() {
			return f.write_str("/");
		}
		for i in &self.0 {
			write!(f, "/{i}")?;
		}
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
	#[error("node path must start with '/'")]
	MissingLeadingSlash,
	#[error("invalid path segment {0:?}")]
	InvalidSegment(String),
}

impl FromStr for NodePath {
	type Err = PathParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let rest = s.strip_prefix('/').ok_or(PathParseError::MissingLeadingSlash)?;
		if rest.is_empty() {
			return Ok(Self::root());
		}
		rest.split('/')
			.map(|seg| seg.parse::<u32>().map_err(|_| PathParseError::InvalidSegment(seg.to_string())))
			.collect::<Result<SmallVec<_>, _>>()
			.map(Self)
	}
}
