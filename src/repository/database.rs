use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::todo::{Todo, TodoList, TodoListData};

/// In-memory session store. Every browser session maps to the serialized
/// JSON form of its list collection; each request rebuilds live values on
/// the way in and writes the serialized form back after mutating. Requests
/// that interleave on one session are last-write-wins.
pub struct Database {
    sessions: Arc<Mutex<HashMap<String, String>>>,
    seed: bool,
}

impl Default for Database {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Database {
    pub fn new(seed: bool) -> Self {
        Database {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            seed,
        }
    }

    /// Rebuilds the session's lists from their stored form. A session seen
    /// for the first time starts empty, or from the demo lists when seeding
    /// is enabled. A payload that no longer decodes is dropped with a
    /// warning rather than poisoning every later request.
    pub fn load(&self, session_id: &str) -> Vec<TodoList> {
        let mut sessions = self.sessions.lock().unwrap();
        let stored = sessions.entry(session_id.to_string()).or_insert_with(|| {
            let initial = if self.seed { seed_lists() } else { Vec::new() };
            serde_json::to_string(&initial).expect("list data serializes to JSON")
        });
        let data: Vec<TodoListData> = match serde_json::from_str(stored) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("session {session_id} held undecodable state, starting over: {err}");
                Vec::new()
            }
        };
        data.into_iter().map(TodoList::from_data).collect()
    }

    pub fn save(&self, session_id: &str, lists: &[TodoList]) {
        let data: Vec<TodoListData> = lists.iter().map(TodoListData::from).collect();
        let serialized = serde_json::to_string(&data).expect("list data serializes to JSON");
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(session_id.to_string(), serialized);
    }
}

// Starter lists for manual testing, in the spirit of the usual demo data.
fn seed_lists() -> Vec<TodoListData> {
    let mut work = TodoList::new("Work Todos").expect("seed titles are not empty");
    for (title, done) in [
        ("Get coffee", true),
        ("Chat with co-workers", true),
        ("Duck out of meeting", false),
    ] {
        let mut todo = Todo::new(title).expect("seed titles are not empty");
        if done {
            todo.mark_done();
        }
        work.add(todo).expect("seed ids are fresh");
    }

    let mut home = TodoList::new("Home Todos").expect("seed titles are not empty");
    for title in ["Feed the cats", "Go to bed", "Buy milk", "Study for the exam"] {
        let todo = Todo::new(title).expect("seed titles are not empty");
        home.add(todo).expect("seed ids are fresh");
    }

    vec![TodoListData::from(&work), TodoListData::from(&home)]
}
