use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::schema::users;
use crate::schema::users::dsl::*;

use super::users_errors::{Result, UserError};
use super::users_model::{NewUser, User, UserDB};

/// Repository for managing user data in the database
pub struct UserRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl UserRepository {
    /// Creates a new UserRepository instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database
    pub fn create(&self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;

        let mut user_db: UserDB = new_user.into();
        if user_db.id.is_empty() {
            user_db.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        diesel::insert_into(users::table)
            .values(&user_db)
            .execute(&mut conn)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(user_db.into())
    }

    /// Retrieves a user by its ID
    pub fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let user = users
            .find(user_id)
            .first::<UserDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    UserError::NotFound(format!("User with id {} not found", user_id))
                }
                _ => UserError::DatabaseError(e.to_string()),
            })?;

        Ok(user.into())
    }

    /// Lists all users ordered by name
    pub fn list(&self) -> Result<Vec<User>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        users
            .order(name.asc())
            .load::<UserDB>(&mut conn)
            .map_err(|e| UserError::DatabaseError(e.to_string()))
            .map(|results| results.into_iter().map(User::from).collect())
    }
}
