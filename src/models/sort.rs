use std::cmp::Ordering;

use super::todo::{Todo, TodoList};

// Compare titles alphabetically, ignoring case.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Display order for the lists index: unfinished lists first, each group in
/// case-insensitive title order. Both passes are stable sorts, so lists with
/// equal titles keep their original relative order. Never mutates the input.
pub fn sort_todo_lists(lists: &[TodoList]) -> Vec<&TodoList> {
    let mut sorted: Vec<&TodoList> = lists.iter().collect();
    sorted.sort_by(|a, b| compare_titles(a.title(), b.title()));
    sorted.sort_by_key(|list| list.is_done());
    sorted
}

/// Display order for the todos of one list: the open and done halves are
/// sorted by title independently and concatenated, open todos first. This is
/// deliberately two separate sorts, not one composite comparison.
pub fn sort_todos(list: &TodoList) -> Vec<&Todo> {
    let (mut undone, mut done): (Vec<&Todo>, Vec<&Todo>) =
        list.todos().iter().partition(|todo| !todo.is_done());
    undone.sort_by(|a, b| compare_titles(a.title(), b.title()));
    done.sort_by(|a, b| compare_titles(a.title(), b.title()));
    undone.extend(done);
    undone
}
