use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Process-wide counters. Lists are numbered across the whole process,
// todos share one counter as well so an id can never repeat within a list.
static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_TODO_ID: AtomicU64 = AtomicU64::new(1);

fn take_list_id() -> u64 {
    NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed)
}

fn take_todo_id() -> u64 {
    NEXT_TODO_ID.fetch_add(1, Ordering::Relaxed)
}

// Ids restored from a stored session must never be handed out again.
fn reserve_list_id(id: u64) {
    NEXT_LIST_ID.fetch_max(id + 1, Ordering::Relaxed);
}

fn reserve_todo_id(id: u64) {
    NEXT_TODO_ID.fetch_max(id + 1, Ordering::Relaxed);
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("todo id {0} already exists in this list")]
    DuplicateId(u64),
    #[error("index {index} is out of bounds for {len} todos")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// A single task: immutable identity, a title, and a done flag.
#[derive(Debug, Clone)]
pub struct Todo {
    id: u64,
    title: String,
    done: bool,
}

impl Todo {
    /// Creates an open todo with a fresh id. Title validation proper lives
    /// in the API layer, the empty check here is only a backstop.
    pub fn new(title: impl Into<String>) -> Result<Self, TodoError> {
        let title = title.into();
        if title.is_empty() {
            return Err(TodoError::EmptyTitle);
        }
        Ok(Todo {
            id: take_todo_id(),
            title,
            done: false,
        })
    }

    /// Rebuilds a todo from its stored form, keeping the original id.
    pub fn from_data(data: TodoData) -> Self {
        reserve_todo_id(data.id);
        Todo {
            id: data.id,
            title: data.title,
            done: data.done,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn mark_done(&mut self) {
        self.done = true;
    }

    pub fn mark_undone(&mut self) {
        self.done = false;
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// A named, ordered collection of todos. The vector keeps insertion order,
/// display order is computed separately by the sort module.
#[derive(Debug, Clone)]
pub struct TodoList {
    id: u64,
    title: String,
    todos: Vec<Todo>,
}

impl TodoList {
    pub fn new(title: impl Into<String>) -> Result<Self, TodoError> {
        let title = title.into();
        if title.is_empty() {
            return Err(TodoError::EmptyTitle);
        }
        Ok(TodoList {
            id: take_list_id(),
            title,
            todos: Vec::new(),
        })
    }

    /// Rebuilds a list and all of its todos from the stored form, keeping
    /// every original id and the stored todo order.
    pub fn from_data(data: TodoListData) -> Self {
        reserve_list_id(data.id);
        TodoList {
            id: data.id,
            title: data.title,
            todos: data.todos.into_iter().map(Todo::from_data).collect(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    /// Appends a todo. Refuses a todo whose id is already present, that
    /// would break identity lookups within the list.
    pub fn add(&mut self, todo: Todo) -> Result<(), TodoError> {
        if self.find_by_id(todo.id).is_some() {
            return Err(TodoError::DuplicateId(todo.id));
        }
        self.todos.push(todo);
        Ok(())
    }

    pub fn find_by_id(&self, id: u64) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: u64) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|todo| todo.id == id)
    }

    /// Positional index of a todo, resolved by its id.
    pub fn find_index_of(&self, todo: &Todo) -> Option<usize> {
        self.todos.iter().position(|t| t.id == todo.id)
    }

    /// Removes and returns the todo at `index`. An out-of-range index is a
    /// caller bug and comes back as a hard error, the list is untouched.
    pub fn remove_at(&mut self, index: usize) -> Result<Todo, TodoError> {
        if index >= self.todos.len() {
            return Err(TodoError::IndexOutOfBounds {
                index,
                len: self.todos.len(),
            });
        }
        Ok(self.todos.remove(index))
    }

    pub fn mark_all_done(&mut self) {
        for todo in &mut self.todos {
            todo.mark_done();
        }
    }

    /// A list counts as done only when it has todos and all of them are
    /// done. An empty list is not done, which keeps it in the upper sort
    /// group.
    pub fn is_done(&self) -> bool {
        !self.todos.is_empty() && self.todos.iter().all(Todo::is_done)
    }
}

pub fn find_list(lists: &[TodoList], id: u64) -> Option<&TodoList> {
    lists.iter().find(|list| list.id == id)
}

pub fn find_list_mut(lists: &mut [TodoList], id: u64) -> Option<&mut TodoList> {
    lists.iter_mut().find(|list| list.id == id)
}

pub fn find_todo(lists: &[TodoList], list_id: u64, todo_id: u64) -> Option<&Todo> {
    find_list(lists, list_id).and_then(|list| list.find_by_id(todo_id))
}

/// Stored form of a todo, the shape the session store persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoData {
    pub id: u64,
    pub title: String,
    pub done: bool,
}

/// Stored form of a list. Round-trips losslessly through the session
/// store: ids, titles, done flags and todo order all survive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoListData {
    pub id: u64,
    pub title: String,
    pub todos: Vec<TodoData>,
}

impl From<&Todo> for TodoData {
    fn from(todo: &Todo) -> Self {
        TodoData {
            id: todo.id,
            title: todo.title.clone(),
            done: todo.done,
        }
    }
}

impl From<&TodoList> for TodoListData {
    fn from(list: &TodoList) -> Self {
        TodoListData {
            id: list.id,
            title: list.title.clone(),
            todos: list.todos.iter().map(TodoData::from).collect(),
        }
    }
}

/// Overview row for the lists index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoListSummary {
    pub id: u64,
    pub title: String,
    pub done: bool,
    pub todos_done: usize,
    pub todos_total: usize,
}

impl From<&TodoList> for TodoListSummary {
    fn from(list: &TodoList) -> Self {
        TodoListSummary {
            id: list.id,
            title: list.title.clone(),
            done: list.is_done(),
            todos_done: list.todos.iter().filter(|todo| todo.done).count(),
            todos_total: list.todos.len(),
        }
    }
}

/// Single-list view. `todos` is in display order, not storage order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoListDetail {
    pub id: u64,
    pub title: String,
    pub done: bool,
    pub todos: Vec<TodoData>,
}
