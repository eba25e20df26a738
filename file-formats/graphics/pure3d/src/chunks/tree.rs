//! Arena storage for decoded chunk trees

use std::fmt;
use std::ops::Deref;

use super::{ChunkData, FromChunkData};

/// Index of a chunk inside its [`ChunkTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(usize);

impl ChunkId {
    pub const ROOT: Self = Self(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// One decoded chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkNode {
    pub type_id: u32,
    /// Absolute offset of the type id
    pub offset: u64,
    pub header_size: u32,
    pub chunk_size: u32,
    pub data: ChunkData,
    parent: Option<ChunkId>,
    children: Vec<ChunkId>,
}

impl ChunkNode {
    pub(crate) fn new(
        type_id: u32,
        offset: u64,
        header_size: u32,
        chunk_size: u32,
        data: ChunkData,
    ) -> Self {
        Self {
            type_id,
            offset,
            header_size,
            chunk_size,
            data,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<ChunkId> {
        self.parent
    }

    pub fn children(&self) -> &[ChunkId] {
        &self.children
    }

    /// Offset one past the last byte of this chunk
    pub fn end(&self) -> u64 {
        self.offset + u64::from(self.chunk_size)
    }
}

/// A decoded chunk tree.
///
/// Nodes are stored in stream order, so the root is always the first node and
/// every parent precedes its children. Trees are only built by the decoder,
/// which never hands out a tree without its root.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkTree {
    nodes: Vec<ChunkNode>,
}

impl ChunkTree {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a node below `parent`, or as the root when `parent` is `None`
    pub(crate) fn push(&mut self, parent: Option<ChunkId>, mut node: ChunkNode) -> ChunkId {
        let id = ChunkId(self.nodes.len());
        node.parent = parent;
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> ChunkRef<'_> {
        ChunkRef {
            tree: self,
            id: ChunkId::ROOT,
        }
    }

    pub fn get(&self, id: ChunkId) -> Option<ChunkRef<'_>> {
        (id.0 < self.nodes.len()).then_some(ChunkRef { tree: self, id })
    }

    pub fn node(&self, id: ChunkId) -> Option<&ChunkNode> {
        self.nodes.get(id.0)
    }

    /// Every chunk in stream order
    pub fn iter(&self) -> impl Iterator<Item = ChunkRef<'_>> {
        (0..self.nodes.len()).map(move |index| ChunkRef {
            tree: self,
            id: ChunkId(index),
        })
    }

    /// Printable outline of the tree, one chunk per line
    pub fn hierarchy(&self) -> Hierarchy<'_> {
        Hierarchy { tree: self }
    }
}

/// Borrowed handle to one chunk of a tree
#[derive(Clone, Copy)]
pub struct ChunkRef<'a> {
    tree: &'a ChunkTree,
    id: ChunkId,
}

impl<'a> ChunkRef<'a> {
    pub fn id(self) -> ChunkId {
        self.id
    }

    pub fn node(self) -> &'a ChunkNode {
        &self.tree.nodes[self.id.0]
    }

    pub fn type_id(self) -> u32 {
        self.node().type_id
    }

    pub fn data(self) -> &'a ChunkData {
        &self.node().data
    }

    pub fn name(self) -> Option<&'a str> {
        self.data().name()
    }

    pub fn is_root(self) -> bool {
        self.node().parent.is_none()
    }

    pub fn parent(self) -> Option<Self> {
        let tree = self.tree;
        self.node().parent.map(|id| ChunkRef { tree, id })
    }

    pub fn children(self) -> impl Iterator<Item = ChunkRef<'a>> {
        let tree = self.tree;
        self.node()
            .children
            .iter()
            .map(move |&id| ChunkRef { tree, id })
    }

    /// Number of ancestors above this chunk
    pub fn depth(self) -> usize {
        std::iter::successors(self.parent(), |chunk| chunk.parent()).count()
    }

    /// The payload, if it is a `T`
    pub fn get<T: FromChunkData>(self) -> Option<&'a T> {
        T::from_data(self.data())
    }

    /// Children whose payload is a `T`, in stream order
    pub fn children_of<T: FromChunkData>(self) -> impl Iterator<Item = TypedChunk<'a, T>> {
        self.children().filter_map(TypedChunk::new)
    }

    pub fn first_child<T: FromChunkData>(self) -> Option<TypedChunk<'a, T>> {
        self.children_of::<T>().next()
    }

    /// Children whose payload is a `T` named `name`
    pub fn children_named<T: FromChunkData>(
        self,
        name: &str,
    ) -> impl Iterator<Item = TypedChunk<'a, T>> {
        self.children_of::<T>()
            .filter(move |child| child.chunk().name() == Some(name))
    }
}

impl fmt::Debug for ChunkRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkRef")
            .field("id", &self.id)
            .field("type_id", &format_args!("{:#010x}", self.type_id()))
            .field("kind", &self.data().kind())
            .finish()
    }
}

/// A chunk together with its payload viewed as `T`
pub struct TypedChunk<'a, T> {
    chunk: ChunkRef<'a>,
    payload: &'a T,
}

impl<'a, T: FromChunkData> TypedChunk<'a, T> {
    fn new(chunk: ChunkRef<'a>) -> Option<Self> {
        chunk.get::<T>().map(|payload| Self { chunk, payload })
    }
}

impl<'a, T> TypedChunk<'a, T> {
    pub fn chunk(&self) -> ChunkRef<'a> {
        self.chunk
    }

    pub fn payload(&self) -> &'a T {
        self.payload
    }
}

impl<T> Clone for TypedChunk<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedChunk<'_, T> {}

impl<T> Deref for TypedChunk<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.payload
    }
}

impl<T: fmt::Debug> fmt::Debug for TypedChunk<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedChunk")
            .field("id", &self.chunk.id)
            .field("payload", self.payload)
            .finish()
    }
}

/// Tab indented outline of a chunk tree
pub struct Hierarchy<'a> {
    tree: &'a ChunkTree,
}

impl fmt::Display for Hierarchy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Depth-first with an explicit stack, children pushed in reverse
        let mut stack = vec![(self.tree.root(), 0usize)];
        while let Some((chunk, depth)) = stack.pop() {
            for _ in 0..depth {
                f.write_str("\t")?;
            }
            writeln!(f, "{}", chunk.data())?;

            let children: Vec<_> = chunk.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        }
        Ok(())
    }
}
