//! Category tree.
//!
//! Categories form a forest through an optional parent reference. The tree
//! views are assembled in memory from the flat list returned by the
//! repository.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::sanitize::{FieldViolation, bounded_text};

/// Number of descendant levels expanded below each root.
pub const MAX_TREE_DEPTH: usize = 5;

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 30;

/// A stored category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub parent: Option<Uuid>,
}

/// Validate a category title: trimmed, 3 to 30 characters.
///
/// # Examples
/// ```
/// use campus::domain::category::category_title;
///
/// assert_eq!(category_title("  Music ").as_deref(), Ok("Music"));
/// assert!(category_title("ab").is_err());
/// ```
pub fn category_title(raw: &str) -> Result<String, FieldViolation> {
    bounded_text("title", "title", raw, TITLE_MIN, TITLE_MAX)
}

/// A category together with its nested children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: Uuid,
    pub title: String,
    pub parent: Option<Uuid>,
    pub children: Vec<CategoryNode>,
}

struct Index<'a> {
    by_parent: HashMap<Option<Uuid>, Vec<&'a Category>>,
}

impl<'a> Index<'a> {
    fn new(categories: &'a [Category]) -> Self {
        let mut by_parent: HashMap<Option<Uuid>, Vec<&'a Category>> = HashMap::new();
        for category in categories {
            by_parent.entry(category.parent).or_default().push(category);
        }
        Self { by_parent }
    }

    fn children_of(&self, parent: Option<Uuid>) -> &[&'a Category] {
        self.by_parent.get(&parent).map_or(&[], Vec::as_slice)
    }

    fn node(&self, category: &Category, remaining: usize) -> CategoryNode {
        let children = if remaining == 0 {
            Vec::new()
        } else {
            self.children_of(Some(category.id))
                .iter()
                .map(|child| self.node(child, remaining - 1))
                .collect()
        };
        CategoryNode {
            id: category.id,
            title: category.title.clone(),
            parent: category.parent,
            children,
        }
    }
}

/// Root categories with up to [`MAX_TREE_DEPTH`] levels of descendants.
pub fn category_tree(categories: &[Category]) -> Vec<CategoryNode> {
    let index = Index::new(categories);
    index
        .children_of(None)
        .iter()
        .map(|root| index.node(root, MAX_TREE_DEPTH))
        .collect()
}

/// `category` with its direct children only.
pub fn with_children(category: &Category, categories: &[Category]) -> CategoryNode {
    Index::new(categories).node(category, 1)
}

/// Identifiers of `root` and every category beneath it.
///
/// Cycles in corrupted data terminate because each id is visited once.
pub fn subtree_ids(categories: &[Category], root: Uuid) -> Vec<Uuid> {
    let index = Index::new(categories);
    let mut seen = HashSet::from([root]);
    let mut ordered = vec![root];
    let mut cursor = 0;
    while let Some(current) = ordered.get(cursor).copied() {
        cursor += 1;
        for child in index.children_of(Some(current)) {
            if seen.insert(child.id) {
                ordered.push(child.id);
            }
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn category(title: &str, parent: Option<Uuid>) -> Category {
        Category {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            parent,
        }
    }

    /// A chain `level0 -> level1 -> ... -> level7` plus a second root.
    #[fixture]
    fn chain() -> Vec<Category> {
        let mut categories = vec![category("other", None)];
        let mut parent = None;
        for level in 0..8 {
            let next = category(&format!("level{level}"), parent);
            parent = Some(next.id);
            categories.push(next);
        }
        categories
    }

    fn depth(node: &CategoryNode) -> usize {
        node.children.iter().map(depth).max().map_or(0, |d| d + 1)
    }

    #[rstest]
    fn tree_lists_roots(chain: Vec<Category>) {
        let tree = category_tree(&chain);
        let titles: Vec<&str> = tree.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["other", "level0"]);
    }

    #[rstest]
    fn tree_depth_is_capped(chain: Vec<Category>) {
        let tree = category_tree(&chain);
        let deep = tree
            .iter()
            .find(|n| n.title == "level0")
            .expect("chain root present");
        assert_eq!(depth(deep), MAX_TREE_DEPTH);
    }

    #[rstest]
    fn with_children_expands_one_level(chain: Vec<Category>) {
        let root = chain
            .iter()
            .find(|c| c.title == "level0")
            .expect("chain root present");
        let node = with_children(root, &chain);
        assert_eq!(node.children.len(), 1);
        assert!(node.children.iter().all(|c| c.children.is_empty()));
    }

    #[rstest]
    fn subtree_is_not_depth_limited(chain: Vec<Category>) {
        let root = chain
            .iter()
            .find(|c| c.title == "level0")
            .expect("chain root present");
        assert_eq!(subtree_ids(&chain, root.id).len(), 8);
    }

    #[rstest]
    fn subtree_survives_cycles() {
        let mut a = category("aaa", None);
        let b = category("bbb", Some(a.id));
        a.parent = Some(b.id);
        let ids = subtree_ids(&[a.clone(), b.clone()], a.id);
        assert_eq!(ids, vec![a.id, b.id]);
    }
}
