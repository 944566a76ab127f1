//! Accessibility node snapshot types

use accesskit::{Action, NodeId, Role};
use mcore_paint::Rect;

/// Node role. Codes are stable across the C boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum A11yRole {
    #[default]
    Unknown = 0,
    Window = 1,
    Group = 2,
    Button = 3,
    CheckBox = 4,
    Label = 5,
    TextInput = 6,
    MultilineTextInput = 7,
    Image = 8,
    Link = 9,
    List = 10,
    ListItem = 11,
    Slider = 12,
    ScrollView = 13,
    Heading = 14,
}

impl A11yRole {
    /// Unknown codes map to [`A11yRole::Unknown`].
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => A11yRole::Window,
            2 => A11yRole::Group,
            3 => A11yRole::Button,
            4 => A11yRole::CheckBox,
            5 => A11yRole::Label,
            6 => A11yRole::TextInput,
            7 => A11yRole::MultilineTextInput,
            8 => A11yRole::Image,
            9 => A11yRole::Link,
            10 => A11yRole::List,
            11 => A11yRole::ListItem,
            12 => A11yRole::Slider,
            13 => A11yRole::ScrollView,
            14 => A11yRole::Heading,
            _ => A11yRole::Unknown,
        }
    }

    pub fn to_accesskit(self) -> Role {
        match self {
            A11yRole::Unknown => Role::Unknown,
            A11yRole::Window => Role::Window,
            A11yRole::Group => Role::Group,
            A11yRole::Button => Role::Button,
            A11yRole::CheckBox => Role::CheckBox,
            A11yRole::Label => Role::Label,
            A11yRole::TextInput => Role::TextInput,
            A11yRole::MultilineTextInput => Role::MultilineTextInput,
            A11yRole::Image => Role::Image,
            A11yRole::Link => Role::Link,
            A11yRole::List => Role::List,
            A11yRole::ListItem => Role::ListItem,
            A11yRole::Slider => Role::Slider,
            A11yRole::ScrollView => Role::ScrollView,
            A11yRole::Heading => Role::Heading,
        }
    }
}

/// A user-triggered accessibility action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum A11yAction {
    Focus = 0,
    Click = 1,
    Blur = 2,
    ScrollIntoView = 3,
    SetValue = 4,
    Increment = 5,
    Decrement = 6,
}

impl A11yAction {
    pub const ALL: [A11yAction; 7] = [
        A11yAction::Focus,
        A11yAction::Click,
        A11yAction::Blur,
        A11yAction::ScrollIntoView,
        A11yAction::SetValue,
        A11yAction::Increment,
        A11yAction::Decrement,
    ];

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn to_accesskit(self) -> Action {
        match self {
            A11yAction::Focus => Action::Focus,
            A11yAction::Click => Action::Click,
            A11yAction::Blur => Action::Blur,
            A11yAction::ScrollIntoView => Action::ScrollIntoView,
            A11yAction::SetValue => Action::SetValue,
            A11yAction::Increment => Action::Increment,
            A11yAction::Decrement => Action::Decrement,
        }
    }

    pub fn from_accesskit(action: Action) -> Option<Self> {
        Some(match action {
            Action::Focus => A11yAction::Focus,
            Action::Click => A11yAction::Click,
            Action::Blur => A11yAction::Blur,
            Action::ScrollIntoView => A11yAction::ScrollIntoView,
            Action::SetValue => A11yAction::SetValue,
            Action::Increment => A11yAction::Increment,
            Action::Decrement => A11yAction::Decrement,
            _ => return None,
        })
    }
}

/// Bitfield of supported actions, bit `n` for action code `n`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ActionSet(u32);

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet(0);

    /// Bits above the known action codes are dropped.
    pub fn from_bits(bits: u32) -> Self {
        ActionSet(bits & ((1 << A11yAction::ALL.len()) - 1))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn with(self, action: A11yAction) -> Self {
        ActionSet(self.0 | 1 << action.code())
    }

    pub fn contains(self, action: A11yAction) -> bool {
        self.0 & (1 << action.code()) != 0
    }

    pub fn iter(self) -> impl Iterator<Item = A11yAction> {
        A11yAction::ALL
            .into_iter()
            .filter(move |action| self.contains(*action))
    }
}

impl FromIterator<A11yAction> for ActionSet {
    fn from_iter<I: IntoIterator<Item = A11yAction>>(iter: I) -> Self {
        iter.into_iter().fold(ActionSet::EMPTY, ActionSet::with)
    }
}

/// One node of a host UI snapshot
#[derive(Debug, Clone, PartialEq, Default)]
pub struct A11yNode {
    pub id: u64,
    pub role: A11yRole,
    pub label: String,
    pub bounds: Rect,
    pub actions: ActionSet,
    /// Ordered child ids
    pub children: Vec<u64>,
    pub value: Option<String>,
    /// `(anchor, focus)` byte offsets into `value`, for editable nodes
    pub text_selection: Option<(usize, usize)>,
}

impl A11yNode {
    pub fn new(id: u64, role: A11yRole) -> Self {
        Self {
            id,
            role,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_children(mut self, children: impl Into<Vec<u64>>) -> Self {
        self.children = children.into();
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_action(mut self, action: A11yAction) -> Self {
        self.actions = self.actions.with(action);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn to_accesskit(&self) -> accesskit::Node {
        let mut node = accesskit::Node::new(self.role.to_accesskit());
        if !self.label.is_empty() {
            node.set_label(self.label.as_str());
        }
        if let Some(value) = &self.value {
            node.set_value(value.as_str());
        }
        node.set_bounds(accesskit::Rect {
            x0: self.bounds.x as f64,
            y0: self.bounds.y as f64,
            x1: self.bounds.right() as f64,
            y1: self.bounds.bottom() as f64,
        });
        node.set_children(
            self.children
                .iter()
                .map(|&child| NodeId(child))
                .collect::<Vec<_>>(),
        );
        for action in self.actions.iter() {
            node.add_action(action.to_accesskit());
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_codes_are_stable() {
        for (code, action) in A11yAction::ALL.iter().enumerate() {
            assert_eq!(action.code(), code as u32);
            assert_eq!(A11yAction::from_code(code as u32), Some(*action));
        }
        assert_eq!(A11yAction::from_code(7), None);
        assert_eq!(A11yAction::from_code(255), None);
    }

    #[test]
    fn test_action_set_bits() {
        let set: ActionSet = [A11yAction::Click, A11yAction::Focus].into_iter().collect();
        assert_eq!(set.bits(), 0b11);
        assert!(set.contains(A11yAction::Click));
        assert!(!set.contains(A11yAction::Blur));
        assert_eq!(ActionSet::from_bits(u32::MAX).iter().count(), 7);
    }

    #[test]
    fn test_to_accesskit_carries_fields() {
        let node = A11yNode::new(5, A11yRole::Button)
            .with_label("OK")
            .with_bounds(Rect::new(10.0, 20.0, 30.0, 40.0))
            .with_children(vec![6, 7])
            .with_action(A11yAction::Click)
            .to_accesskit();
        assert_eq!(node.role(), Role::Button);
        assert_eq!(node.label(), Some("OK"));
        assert_eq!(node.children(), &[NodeId(6), NodeId(7)]);
        let bounds = node.bounds().unwrap();
        assert_eq!((bounds.x1, bounds.y1), (40.0, 60.0));
        assert!(node.supports_action(Action::Click));
        assert!(!node.supports_action(Action::Focus));
    }
}
