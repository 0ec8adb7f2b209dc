//! Ordering providers for namespaces, types and members
//!
//! A provider is a pure, stateless function of its input: the same entities
//! in the same metadata order always come back in the same order, no matter
//! which thread asks. Ties are broken by declaration order so the result is
//! total.

use serde::Deserialize;

use crate::library::Ordered;

/// Pluggable ordering policy consulted by the surface builder
pub trait OrderingProvider {
    fn order_namespaces<'a, T: Ordered>(&self, namespaces: &'a [T]) -> Vec<&'a T>;

    fn order_types<'a, T: Ordered>(&self, types: &'a [T]) -> Vec<&'a T>;

    fn order_members<'a, T: Ordered>(&self, members: &'a [T]) -> Vec<&'a T>;
}

/// Sort key for declaration order: explicit position, else metadata index
fn declaration_key<T: Ordered>(index: usize, item: &T) -> (u64, usize) {
    let position = item
        .declaration_position()
        .map_or(index as u64, u64::from);
    (position, index)
}

/// Entities in declaration order
pub fn by_declaration<T: Ordered>(items: &[T]) -> Vec<&T> {
    let mut indexed: Vec<(usize, &T)> = items.iter().enumerate().collect();
    indexed.sort_by_key(|(i, item)| declaration_key(*i, *item));
    indexed.into_iter().map(|(_, item)| item).collect()
}

/// Entities by ordinal (byte-wise, case-sensitive) name, ties by declaration
pub fn by_name<T: Ordered>(items: &[T]) -> Vec<&T> {
    let mut indexed: Vec<(usize, &T)> = items.iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| {
        a.order_name()
            .cmp(b.order_name())
            .then_with(|| declaration_key(*ia, *a).cmp(&declaration_key(*ib, *b)))
    });
    indexed.into_iter().map(|(_, item)| item).collect()
}

/// Everything in declaration order (the default)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclarationOrder;

impl OrderingProvider for DeclarationOrder {
    fn order_namespaces<'a, T: Ordered>(&self, namespaces: &'a [T]) -> Vec<&'a T> {
        by_declaration(namespaces)
    }

    fn order_types<'a, T: Ordered>(&self, types: &'a [T]) -> Vec<&'a T> {
        by_declaration(types)
    }

    fn order_members<'a, T: Ordered>(&self, members: &'a [T]) -> Vec<&'a T> {
        by_declaration(members)
    }
}

/// Everything by ordinal name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameOrder;

impl OrderingProvider for NameOrder {
    fn order_namespaces<'a, T: Ordered>(&self, namespaces: &'a [T]) -> Vec<&'a T> {
        by_name(namespaces)
    }

    fn order_types<'a, T: Ordered>(&self, types: &'a [T]) -> Vec<&'a T> {
        by_name(types)
    }

    fn order_members<'a, T: Ordered>(&self, members: &'a [T]) -> Vec<&'a T> {
        by_name(members)
    }
}

/// Provider chosen at runtime, e.g. from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingKind {
    #[default]
    Declaration,
    Name,
}

impl OrderingProvider for OrderingKind {
    fn order_namespaces<'a, T: Ordered>(&self, namespaces: &'a [T]) -> Vec<&'a T> {
        match self {
            OrderingKind::Declaration => DeclarationOrder.order_namespaces(namespaces),
            OrderingKind::Name => NameOrder.order_namespaces(namespaces),
        }
    }

    fn order_types<'a, T: Ordered>(&self, types: &'a [T]) -> Vec<&'a T> {
        match self {
            OrderingKind::Declaration => DeclarationOrder.order_types(types),
            OrderingKind::Name => NameOrder.order_types(types),
        }
    }

    fn order_members<'a, T: Ordered>(&self, members: &'a [T]) -> Vec<&'a T> {
        match self {
            OrderingKind::Declaration => DeclarationOrder.order_members(members),
            OrderingKind::Name => NameOrder.order_members(members),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        name: &'static str,
        position: Option<u32>,
    }

    impl Ordered for Item {
        fn order_name(&self) -> &str {
            self.name
        }

        fn declaration_position(&self) -> Option<u32> {
            self.position
        }
    }

    fn item(name: &'static str, position: Option<u32>) -> Item {
        Item { name, position }
    }

    fn names(items: Vec<&Item>) -> Vec<&'static str> {
        items.into_iter().map(|i| i.name).collect()
    }

    #[test]
    fn test_declaration_order_follows_positions() {
        let items = vec![item("c", Some(2)), item("a", Some(0)), item("b", Some(1))];
        assert_eq!(names(DeclarationOrder.order_members(&items)), ["a", "b", "c"]);
    }

    #[test]
    fn test_declaration_order_without_positions_keeps_metadata_order() {
        let items = vec![item("z", None), item("a", None), item("m", None)];
        assert_eq!(names(DeclarationOrder.order_types(&items)), ["z", "a", "m"]);
    }

    #[test]
    fn test_name_order_is_ordinal_case_sensitive() {
        let items = vec![item("beta", None), item("Alpha", None), item("alpha", None)];
        // Uppercase sorts before lowercase under ordinal comparison
        assert_eq!(names(NameOrder.order_types(&items)), ["Alpha", "alpha", "beta"]);
    }

    #[test]
    fn test_name_order_ties_fall_back_to_declaration() {
        let items = vec![
            item("Run", Some(5)),
            item("Run", Some(1)),
            item("Run", None), // metadata index 2
        ];
        let ordered = NameOrder.order_members(&items);
        let positions: Vec<Option<u32>> = ordered.iter().map(|i| i.position).collect();
        assert_eq!(positions, [Some(1), None, Some(5)]);
    }

    #[test]
    fn test_ordering_kind_delegates() {
        let items = vec![item("b", None), item("a", None)];
        assert_eq!(names(OrderingKind::Name.order_namespaces(&items)), ["a", "b"]);
        assert_eq!(
            names(OrderingKind::Declaration.order_namespaces(&items)),
            ["b", "a"]
        );
    }
}
