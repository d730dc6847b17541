use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

const LEAF: u16 = 0;
const CHILDREN: u16 = 1;

/// Deepest tree the codec accepts, counting the root as 1. Builders cap
/// trees at this depth so everything they produce can be read back.
pub const MAX_DEPTH: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
	pub value: f64,
	pub column: usize,
}

impl Split {
	pub fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		writer.write_f64::<BigEndian>(self.value)?;
		writer.write_u16::<BigEndian>(self.column as u16)?;

		Ok(())
	}

	pub fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		let value = reader.read_f64::<BigEndian>()?;
		let column = reader.read_u16::<BigEndian>()? as usize;

		Ok(Self { value, column })
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	Leaf(f64),
	Children {
		left: Box<Node>,
		right: Box<Node>,
		split: Split,
	},
}

impl Node {
	/// Rows with `x[column] <= value` go left, matching how the builder
	/// partitions the sorted column.
	pub fn predict(&self, x: &[f64]) -> f64 {
		match self {
			Node::Leaf(value) => *value,
			Node::Children { left, right, split } => {
				if x[split.column] <= split.value {
					left.predict(x)
				} else {
					right.predict(x)
				}
			},
		}
	}

	pub fn depth(&self) -> usize {
		match self {
			Node::Leaf(_) => 1,
			Node::Children { left, right, .. } => 1 + left.depth().max(right.depth()),
		}
	}

	pub fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		match self {
			Node::Leaf(value) => {
				writer.write_u16::<BigEndian>(LEAF)?;
				writer.write_f64::<BigEndian>(*value)?;
			},
			Node::Children { left, right, split } => {
				writer.write_u16::<BigEndian>(CHILDREN)?;
				split.serialize(writer)?;
				left.serialize(writer)?;
				right.serialize(writer)?;
			}
		}

		Ok(())
	}

	pub fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		Self::deserialize_at(reader, 1)
	}

	fn deserialize_at<R: Read>(reader: &mut R, depth: usize) -> std::io::Result<Self> {
		if depth > MAX_DEPTH {
			return Err(std::io::Error::new(
				std::io::ErrorKind::InvalidData,
				format!("tree deeper than {} levels", MAX_DEPTH),
			));
		}

		match reader.read_u16::<BigEndian>()? {
			LEAF => Ok(Node::Leaf(reader.read_f64::<BigEndian>()?)),
			CHILDREN => {
				let split = Split::deserialize(reader)?;
				let left = Box::new(Node::deserialize_at(reader, depth + 1)?);
				let right = Box::new(Node::deserialize_at(reader, depth + 1)?);

				Ok(Node::Children { split, left, right })
			},
			i => Err(std::io::Error::new(
				std::io::ErrorKind::InvalidData,
				format!("unknown node type {:?}", i),
			)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn stump() -> Node {
		Node::Children {
			split: Split { column: 2, value: 300000.0 },
			left: Box::new(Node::Leaf(0.0)),
			right: Box::new(Node::Leaf(1.0)),
		}
	}

	#[test]
	fn threshold_goes_left() {
		let node = stump();
		assert_eq!(node.predict(&[4.0, 9.0, 300000.0, 80.0, 6.7]), 0.0);
		assert_eq!(node.predict(&[4.0, 9.0, 300000.5, 80.0, 6.7]), 1.0);
		assert_eq!(node.depth(), 2);
	}

	#[test]
	fn codec_layout() -> std::io::Result<()> {
		let mut bytes = Vec::new();
		stump().serialize(&mut bytes)?;

		// tag + (value + column) + 2 * (tag + value)
		assert_eq!(bytes.len(), 2 + (8 + 2) + 2 * (2 + 8));
		assert_eq!(&bytes[0..2], &[0, 1]);
		assert_eq!(Node::deserialize(&mut bytes.as_slice())?, stump());

		Ok(())
	}

	#[test]
	fn rejects_unknown_tag_and_truncation() {
		let err = Node::deserialize(&mut [0u8, 9].as_ref()).unwrap_err();
		assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

		let mut bytes = Vec::new();
		stump().serialize(&mut bytes).unwrap();
		bytes.truncate(bytes.len() - 3);
		let err = Node::deserialize(&mut bytes.as_slice()).unwrap_err();
		assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
	}

	fn nested_splits(levels: usize) -> Vec<u8> {
		let mut bytes = Vec::new();
		for _ in 0..levels {
			bytes.extend_from_slice(&CHILDREN.to_be_bytes());
			bytes.extend_from_slice(&0.5f64.to_be_bytes());
			bytes.extend_from_slice(&0u16.to_be_bytes());
		}
		bytes
	}

	#[test]
	fn rejects_overly_deep_trees() {
		let err = Node::deserialize(&mut nested_splits(200_000).as_slice()).unwrap_err();
		assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
	}

	#[test]
	fn accepts_trees_at_max_depth() -> std::io::Result<()> {
		// Left spine of splits, each closed by a right leaf, ending in a leaf.
		let mut bytes = Vec::new();
		for _ in 0..MAX_DEPTH - 1 {
			bytes.extend_from_slice(&nested_splits(1));
		}
		for _ in 0..MAX_DEPTH {
			bytes.extend_from_slice(&LEAF.to_be_bytes());
			bytes.extend_from_slice(&1.0f64.to_be_bytes());
		}

		let node = Node::deserialize(&mut bytes.as_slice())?;
		assert_eq!(node.depth(), MAX_DEPTH);

		Ok(())
	}
}
