//! Retained widget tree.
//!
//! Widgets live in a generational arena: a [`WidgetId`] from a deleted
//! subtree never aliases a newer widget, it just stops resolving.

use std::fmt;
use std::sync::Arc;

use super::geometry::Rect;
use super::ToolkitError;

pub type ClickHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId {
    index: u32,
    generation: u32,
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Self((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSize {
    Small,
    #[default]
    Normal,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub size: FontSize,
    pub color: Rgb,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self { size: FontSize::Normal, color: Rgb(0xff, 0xff, 0xff) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WidgetStyle {
    pub background: Option<Rgb>,
    pub border: bool,
    pub text: Option<TextStyle>,
}

pub enum WidgetKind {
    Container,
    Label { text: String },
    Button { on_click: Option<ClickHandler> },
}

impl WidgetKind {
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label { text: text.into() }
    }

    pub fn button(on_click: impl Fn() + Send + Sync + 'static) -> Self {
        Self::Button { on_click: Some(Arc::new(on_click)) }
    }
}

impl fmt::Debug for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => f.write_str("Container"),
            Self::Label { text } => f.debug_struct("Label").field("text", text).finish(),
            Self::Button { on_click } => f
                .debug_struct("Button")
                .field("wired", &on_click.is_some())
                .finish(),
        }
    }
}

#[derive(Debug)]
pub struct Node {
    pub parent: Option<WidgetId>,
    pub children: Vec<WidgetId>,
    /// Relative to the parent's origin.
    pub rect: Rect,
    pub kind: WidgetKind,
    pub style: WidgetStyle,
}

impl Node {
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            WidgetKind::Label { text } => Some(text),
            _ => None,
        }
    }

    pub fn is_button(&self) -> bool {
        matches!(self.kind, WidgetKind::Button { .. })
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

pub struct WidgetTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: WidgetId,
    dirty: bool,
}

impl WidgetTree {
    pub fn new(width: i32, height: i32) -> Self {
        let root_node = Node {
            parent: None,
            children: Vec::new(),
            rect: Rect::sized(width, height),
            kind: WidgetKind::Container,
            style: WidgetStyle::default(),
        };
        Self {
            slots: vec![Slot { generation: 0, node: Some(root_node) }],
            free: Vec::new(),
            root: WidgetId { index: 0, generation: 0 },
            dirty: true,
        }
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn get(&self, id: WidgetId) -> Result<&Node, ToolkitError> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(ToolkitError::StaleWidget(id))
    }

    fn get_mut(&mut self, id: WidgetId) -> Result<&mut Node, ToolkitError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(ToolkitError::StaleWidget(id))
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.get(id).is_ok()
    }

    /// Number of live widgets, root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.get(self.root).map_or(true, |root| root.children.is_empty())
    }

    pub fn create(
        &mut self,
        parent: WidgetId,
        kind: WidgetKind,
        rect: Rect,
    ) -> Result<WidgetId, ToolkitError> {
        self.get(parent)?;
        let node = Node {
            parent: Some(parent),
            children: Vec::new(),
            rect,
            kind,
            style: WidgetStyle::default(),
        };

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                WidgetId { index, generation: slot.generation }
            }
            None => {
                let index = u32::try_from(self.slots.len()).map_err(|_| ToolkitError::Exhausted)?;
                self.slots.push(Slot { generation: 0, node: Some(node) });
                WidgetId { index, generation: 0 }
            }
        };

        self.get_mut(parent)?.children.push(id);
        self.dirty = true;
        Ok(id)
    }

    /// Delete `id` and its whole subtree.
    pub fn delete(&mut self, id: WidgetId) -> Result<(), ToolkitError> {
        if id == self.root {
            return Err(ToolkitError::RootWidget);
        }
        let parent = self.get(id)?.parent;
        if let Some(parent) = parent {
            if let Ok(p) = self.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        self.release(id);
        self.dirty = true;
        Ok(())
    }

    /// Delete every child of `id`, keeping `id` itself.
    pub fn clean(&mut self, id: WidgetId) -> Result<(), ToolkitError> {
        let children = std::mem::take(&mut self.get_mut(id)?.children);
        for child in children {
            self.release(child);
        }
        self.dirty = true;
        Ok(())
    }

    fn release(&mut self, id: WidgetId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self.slots.get_mut(current.index as usize) else {
                continue;
            };
            if slot.generation != current.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                stack.extend(node.children);
            }
        }
    }

    pub fn set_text(&mut self, id: WidgetId, text: impl Into<String>) -> Result<(), ToolkitError> {
        match &mut self.get_mut(id)?.kind {
            WidgetKind::Label { text: current } => {
                *current = text.into();
                self.dirty = true;
                Ok(())
            }
            _ => Err(ToolkitError::NotALabel(id)),
        }
    }

    pub fn set_style(&mut self, id: WidgetId, style: WidgetStyle) -> Result<(), ToolkitError> {
        self.get_mut(id)?.style = style;
        self.dirty = true;
        Ok(())
    }

    pub fn set_text_style(&mut self, id: WidgetId, text: TextStyle) -> Result<(), ToolkitError> {
        self.get_mut(id)?.style.text = Some(text);
        self.dirty = true;
        Ok(())
    }

    pub fn set_rect(&mut self, id: WidgetId, rect: Rect) -> Result<(), ToolkitError> {
        self.get_mut(id)?.rect = rect;
        self.dirty = true;
        Ok(())
    }

    /// Position of `id` in display coordinates.
    pub fn absolute_rect(&self, id: WidgetId) -> Result<Rect, ToolkitError> {
        let mut node = self.get(id)?;
        let mut rect = node.rect;
        while let Some(parent) = node.parent {
            node = self.get(parent)?;
            rect = rect.offset_by(node.rect);
        }
        Ok(rect)
    }

    /// Pre-order walk from the root, yielding each widget with its absolute rect.
    /// Children come after their parent, so drawing in this order paints them on top.
    pub fn walk(&self) -> Vec<(WidgetId, Rect)> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![(self.root, Rect::default())];
        while let Some((id, origin)) = stack.pop() {
            let Ok(node) = self.get(id) else { continue };
            let rect = node.rect.offset_by(origin);
            out.push((id, rect));
            for child in node.children.iter().rev() {
                stack.push((*child, rect));
            }
        }
        out
    }

    /// Topmost button under the point, if any.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<WidgetId> {
        self.walk()
            .into_iter()
            .rev()
            .find(|(id, rect)| {
                rect.contains(x, y) && self.get(*id).map_or(false, Node::is_button)
            })
            .map(|(id, _)| id)
    }

    /// Buttons in drawing order, used for keyboard focus traversal.
    pub fn buttons(&self) -> Vec<WidgetId> {
        self.walk()
            .into_iter()
            .filter(|(id, _)| self.get(*id).map_or(false, Node::is_button))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn click_handler(&self, id: WidgetId) -> Option<ClickHandler> {
        match &self.get(id).ok()?.kind {
            WidgetKind::Button { on_click } => on_click.clone(),
            _ => None,
        }
    }

    /// Texts of every label, in drawing order.
    pub fn label_texts(&self) -> Vec<String> {
        self.walk()
            .into_iter()
            .filter_map(|(id, _)| self.get(id).ok()?.text().map(str::to_owned))
            .collect()
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn clean_drops_the_subtree_but_keeps_the_parent() {
        let mut tree = WidgetTree::new(100, 100);
        let root = tree.root();
        let a = tree.create(root, WidgetKind::Container, Rect::sized(50, 50)).unwrap();
        let b = tree.create(a, WidgetKind::label("hi"), Rect::sized(10, 10)).unwrap();

        tree.clean(root).unwrap();
        assert!(tree.contains(root));
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
    }

    #[test]
    fn stale_ids_do_not_alias_reused_slots() {
        let mut tree = WidgetTree::new(10, 10);
        let root = tree.root();
        let old = tree.create(root, WidgetKind::label("old"), Rect::sized(1, 1)).unwrap();
        tree.delete(old).unwrap();
        let new = tree.create(root, WidgetKind::label("new"), Rect::sized(1, 1)).unwrap();

        assert_ne!(old, new);
        assert!(matches!(tree.set_text(old, "x"), Err(ToolkitError::StaleWidget(_))));
        assert_eq!(tree.get(new).unwrap().text(), Some("new"));
    }

    #[test]
    fn root_cannot_be_deleted() {
        let mut tree = WidgetTree::new(10, 10);
        assert!(matches!(tree.delete(tree.root()), Err(ToolkitError::RootWidget)));
    }

    #[test]
    fn hit_test_finds_nested_button_in_absolute_coordinates() {
        let mut tree = WidgetTree::new(200, 200);
        let root = tree.root();
        let panel = tree.create(root, WidgetKind::Container, Rect::new(100, 100, 100, 100)).unwrap();
        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&clicks);
        let button = tree
            .create(
                panel,
                WidgetKind::button(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
                Rect::new(10, 10, 20, 20),
            )
            .unwrap();
        tree.create(button, WidgetKind::label("ok"), Rect::sized(20, 20)).unwrap();

        assert_eq!(tree.absolute_rect(button).unwrap(), Rect::new(110, 110, 20, 20));
        assert_eq!(tree.hit_test(115, 125), Some(button));
        assert_eq!(tree.hit_test(15, 15), None);

        (tree.click_handler(button).unwrap())();
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dirty_flag_tracks_mutations() {
        let mut tree = WidgetTree::new(10, 10);
        assert!(tree.take_dirty());
        assert!(!tree.take_dirty());
        let label = tree.create(tree.root(), WidgetKind::label("a"), Rect::sized(1, 1)).unwrap();
        assert!(tree.take_dirty());
        tree.set_text(label, "b").unwrap();
        assert!(tree.take_dirty());
    }
}
