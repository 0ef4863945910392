use rocket::{Request, catch};

#[catch(404)]
pub fn not_found(_req: &Request) -> &'static str {
    "not found"
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> &'static str {
    "internal server error"
}
