mod users;

pub use users::user_routes;
