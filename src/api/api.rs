use actix_web::cookie::Cookie;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, HttpResponseBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::sort::{sort_todo_lists, sort_todos};
use crate::models::todo::{
    find_list, find_list_mut, find_todo, Todo, TodoData, TodoList, TodoListDetail,
    TodoListSummary,
};
use crate::repository::database::Database;
use crate::Response;

const SESSION_COOKIE: &str = "session_id";

// The browser session a request belongs to. First-time visitors get a
// fresh id and a cookie on the way out.
struct Session {
    id: String,
    fresh: bool,
}

impl Session {
    fn from_request(req: &HttpRequest) -> Self {
        match req.cookie(SESSION_COOKIE) {
            Some(cookie) => Session {
                id: cookie.value().to_string(),
                fresh: false,
            },
            None => Session {
                id: Uuid::new_v4().to_string(),
                fresh: true,
            },
        }
    }

    fn apply(&self, builder: &mut HttpResponseBuilder) {
        if self.fresh {
            builder.cookie(
                Cookie::build(SESSION_COOKIE, self.id.clone())
                    .path("/")
                    .http_only(true)
                    .finish(),
            );
        }
    }
}

fn respond(
    session: &Session,
    mut builder: HttpResponseBuilder,
    body: &impl Serialize,
) -> HttpResponse {
    session.apply(&mut builder);
    builder.json(body)
}

fn not_found(session: &Session, message: &str) -> HttpResponse {
    respond(
        session,
        HttpResponse::NotFound(),
        &Response {
            message: message.to_string(),
        },
    )
}

fn invalid(session: &Session, message: String) -> HttpResponse {
    respond(session, HttpResponse::UnprocessableEntity(), &Response { message })
}

// Title rules from the form layer: trimmed, 1 to 100 characters.
fn validate_title(raw: &str, kind: &str) -> Result<String, String> {
    let title = raw.trim();
    if title.is_empty() {
        Err("A title was not provided.".to_string())
    } else if title.chars().count() > 100 {
        Err(format!("{kind} title must be between 1 and 100 characters."))
    } else {
        Ok(title.to_string())
    }
}

// List titles must be unique per session. `exclude` lets a rename keep the
// list's own current title.
fn title_taken(lists: &[TodoList], title: &str, exclude: Option<u64>) -> bool {
    lists
        .iter()
        .any(|list| list.title() == title && Some(list.id()) != exclude)
}

fn list_detail(list: &TodoList) -> TodoListDetail {
    TodoListDetail {
        id: list.id(),
        title: list.title().to_string(),
        done: list.is_done(),
        todos: sort_todos(list).into_iter().map(TodoData::from).collect(),
    }
}

#[derive(Debug, Deserialize)]
pub struct TitlePayload {
    pub title: String,
}

#[get("/lists")]
pub async fn get_lists(req: HttpRequest, db: web::Data<Database>) -> HttpResponse {
    let session = Session::from_request(&req);
    let lists = db.load(&session.id);
    let summaries: Vec<TodoListSummary> = sort_todo_lists(&lists)
        .into_iter()
        .map(TodoListSummary::from)
        .collect();
    respond(&session, HttpResponse::Ok(), &summaries)
}

#[post("/lists")]
pub async fn create_list(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<TitlePayload>,
) -> HttpResponse {
    let session = Session::from_request(&req);
    let title = match validate_title(&payload.title, "List") {
        Ok(title) => title,
        Err(message) => return invalid(&session, message),
    };
    let mut lists = db.load(&session.id);
    if title_taken(&lists, &title, None) {
        return invalid(&session, "List title must be unique.".to_string());
    }
    let list = match TodoList::new(title) {
        Ok(list) => list,
        Err(err) => return invalid(&session, err.to_string()),
    };
    let summary = TodoListSummary::from(&list);
    lists.push(list);
    db.save(&session.id, &lists);
    respond(&session, HttpResponse::Ok(), &summary)
}

#[get("/lists/{id}")]
pub async fn get_list(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<u64>,
) -> HttpResponse {
    let session = Session::from_request(&req);
    let list_id = path.into_inner();
    let lists = db.load(&session.id);
    match find_list(&lists, list_id) {
        Some(list) => respond(&session, HttpResponse::Ok(), &list_detail(list)),
        None => not_found(&session, "List not found"),
    }
}

#[put("/lists/{id}")]
pub async fn update_list(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<u64>,
    payload: web::Json<TitlePayload>,
) -> HttpResponse {
    let session = Session::from_request(&req);
    let list_id = path.into_inner();
    let title = match validate_title(&payload.title, "List") {
        Ok(title) => title,
        Err(message) => return invalid(&session, message),
    };
    let mut lists = db.load(&session.id);
    if title_taken(&lists, &title, Some(list_id)) {
        return invalid(&session, "List title must be unique.".to_string());
    }
    let summary = match find_list_mut(&mut lists, list_id) {
        Some(list) => {
            list.set_title(title);
            TodoListSummary::from(&*list)
        }
        None => return not_found(&session, "List not found"),
    };
    db.save(&session.id, &lists);
    respond(&session, HttpResponse::Ok(), &summary)
}

#[delete("/lists/{id}")]
pub async fn delete_list(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<u64>,
) -> HttpResponse {
    let session = Session::from_request(&req);
    let list_id = path.into_inner();
    let mut lists = db.load(&session.id);
    match lists.iter().position(|list| list.id() == list_id) {
        Some(index) => {
            lists.remove(index);
            db.save(&session.id, &lists);
            respond(
                &session,
                HttpResponse::Ok(),
                &Response {
                    message: "Todo list deleted.".to_string(),
                },
            )
        }
        None => not_found(&session, "List not found"),
    }
}

#[post("/lists/{id}/complete")]
pub async fn complete_all(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<u64>,
) -> HttpResponse {
    let session = Session::from_request(&req);
    let list_id = path.into_inner();
    let mut lists = db.load(&session.id);
    let detail = match find_list_mut(&mut lists, list_id) {
        Some(list) => {
            list.mark_all_done();
            list_detail(&*list)
        }
        None => return not_found(&session, "List not found"),
    };
    db.save(&session.id, &lists);
    respond(&session, HttpResponse::Ok(), &detail)
}

#[post("/lists/{id}/todos")]
pub async fn create_todo(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<u64>,
    payload: web::Json<TitlePayload>,
) -> HttpResponse {
    let session = Session::from_request(&req);
    let list_id = path.into_inner();
    let title = match validate_title(&payload.title, "Todo") {
        Ok(title) => title,
        Err(message) => return invalid(&session, message),
    };
    let mut lists = db.load(&session.id);
    let created = {
        let list = match find_list_mut(&mut lists, list_id) {
            Some(list) => list,
            None => return not_found(&session, "List not found"),
        };
        let todo = match Todo::new(title) {
            Ok(todo) => todo,
            Err(err) => return invalid(&session, err.to_string()),
        };
        let data = TodoData::from(&todo);
        if let Err(err) = list.add(todo) {
            return respond(
                &session,
                HttpResponse::InternalServerError(),
                &Response {
                    message: err.to_string(),
                },
            );
        }
        data
    };
    db.save(&session.id, &lists);
    respond(&session, HttpResponse::Ok(), &created)
}

#[get("/lists/{id}/todos/{todo_id}")]
pub async fn get_todo(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<(u64, u64)>,
) -> HttpResponse {
    let session = Session::from_request(&req);
    let (list_id, todo_id) = path.into_inner();
    let lists = db.load(&session.id);
    if find_list(&lists, list_id).is_none() {
        return not_found(&session, "List not found");
    }
    match find_todo(&lists, list_id, todo_id) {
        Some(todo) => respond(&session, HttpResponse::Ok(), &TodoData::from(todo)),
        None => not_found(&session, "Todo not found"),
    }
}

#[put("/lists/{id}/todos/{todo_id}")]
pub async fn update_todo(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<(u64, u64)>,
    payload: web::Json<TitlePayload>,
) -> HttpResponse {
    let session = Session::from_request(&req);
    let (list_id, todo_id) = path.into_inner();
    let title = match validate_title(&payload.title, "Todo") {
        Ok(title) => title,
        Err(message) => return invalid(&session, message),
    };
    let mut lists = db.load(&session.id);
    let updated = {
        let list = match find_list_mut(&mut lists, list_id) {
            Some(list) => list,
            None => return not_found(&session, "List not found"),
        };
        let todo = match list.find_by_id_mut(todo_id) {
            Some(todo) => todo,
            None => return not_found(&session, "Todo not found"),
        };
        todo.set_title(title);
        TodoData::from(&*todo)
    };
    db.save(&session.id, &lists);
    respond(&session, HttpResponse::Ok(), &updated)
}

#[put("/lists/{id}/todos/{todo_id}/toggle")]
pub async fn toggle_todo(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<(u64, u64)>,
) -> HttpResponse {
    let session = Session::from_request(&req);
    let (list_id, todo_id) = path.into_inner();
    let mut lists = db.load(&session.id);
    let updated = {
        let list = match find_list_mut(&mut lists, list_id) {
            Some(list) => list,
            None => return not_found(&session, "List not found"),
        };
        let todo = match list.find_by_id_mut(todo_id) {
            Some(todo) => todo,
            None => return not_found(&session, "Todo not found"),
        };
        if todo.is_done() {
            todo.mark_undone();
        } else {
            todo.mark_done();
        }
        TodoData::from(&*todo)
    };
    db.save(&session.id, &lists);
    respond(&session, HttpResponse::Ok(), &updated)
}

#[delete("/lists/{id}/todos/{todo_id}")]
pub async fn delete_todo(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<(u64, u64)>,
) -> HttpResponse {
    let session = Session::from_request(&req);
    let (list_id, todo_id) = path.into_inner();
    let mut lists = db.load(&session.id);
    {
        let list = match find_list_mut(&mut lists, list_id) {
            Some(list) => list,
            None => return not_found(&session, "List not found"),
        };
        let index = match list.find_by_id(todo_id) {
            Some(todo) => list.find_index_of(todo),
            None => None,
        };
        let index = match index {
            Some(index) => index,
            None => return not_found(&session, "Todo not found"),
        };
        if let Err(err) = list.remove_at(index) {
            return respond(
                &session,
                HttpResponse::InternalServerError(),
                &Response {
                    message: err.to_string(),
                },
            );
        }
    }
    db.save(&session.id, &lists);
    respond(
        &session,
        HttpResponse::Ok(),
        &Response {
            message: "The todo has been deleted.".to_string(),
        },
    )
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(get_lists)
            .service(create_list)
            .service(get_list)
            .service(update_list)
            .service(delete_list)
            .service(complete_all)
            .service(create_todo)
            .service(get_todo)
            .service(update_todo)
            .service(toggle_todo)
            .service(delete_todo),
    );
}
