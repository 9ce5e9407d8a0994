//! In-memory implementation of every repository trait.
//!
//! Mirrors the Postgres constraints (unique user name, unique movie title,
//! unique `(user_id, movie_id)` favourite, cascading deletes) so handlers
//! behave the same against either backend. Used by unit tests and the
//! test server harness.

use crate::errors::ApiError;
use crate::models::{
    CreatedBy, FavouriteId, FavouriteMovie, Movie, MovieFilter, MovieId, MovieWithAuthor,
    NewMovie, User, UserId,
};
use crate::repositories::{FavouriteRepository, MovieRepository, UserRepository};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    movies: BTreeMap<MovieId, Movie>,
    favourites: BTreeMap<FavouriteId, (UserId, MovieId)>,
    next_user_id: i64,
    next_movie_id: i64,
    next_favourite_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Shared in-memory store for users, movies and favourites.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_user_lookups: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `UserRepository::exists` fail with a database error.
    pub fn set_fail_user_lookups(&self, fail: bool) {
        self.fail_user_lookups.store(fail, Ordering::SeqCst);
    }

    /// Delete a user together with their movies and favourites.
    pub async fn remove_user(&self, id: UserId) -> bool {
        let mut state = self.state.lock().await;
        if state.users.remove(&id).is_none() {
            return false;
        }
        state.movies.retain(|_, movie| movie.user_id != id);
        let State {
            movies, favourites, ..
        } = &mut *state;
        favourites.retain(|_, (user_id, movie_id)| *user_id != id && movies.contains_key(movie_id));
        true
    }

    /// Number of stored movies.
    pub async fn movie_count(&self) -> usize {
        self.state.lock().await.movies.len()
    }

    /// Number of stored favourites across all users.
    pub async fn favourite_count(&self) -> usize {
        self.state.lock().await.favourites.len()
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, name: &str, password_hash: &str) -> Result<UserId, ApiError> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.name == name) {
            return Err(ApiError::DuplicateEntry);
        }

        let id = UserId(next_id(&mut state.next_user_id));
        state.users.insert(
            id,
            User {
                id,
                name: name.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<User>, ApiError> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.name == name).cloned())
    }

    async fn exists(&self, id: UserId) -> Result<bool, ApiError> {
        if self.fail_user_lookups.load(Ordering::SeqCst) {
            return Err(ApiError::Database("user lookup unavailable".to_string()));
        }
        Ok(self.state.lock().await.users.contains_key(&id))
    }

    async fn count(&self) -> Result<i64, ApiError> {
        Ok(self.state.lock().await.users.len() as i64)
    }
}

#[async_trait::async_trait]
impl MovieRepository for InMemoryStore {
    async fn insert(&self, movie: &NewMovie, owner: UserId) -> Result<MovieId, ApiError> {
        let mut state = self.state.lock().await;
        if state.movies.values().any(|m| m.title == movie.title) {
            return Err(ApiError::DuplicateEntry);
        }
        if !state.users.contains_key(&owner) {
            return Err(ApiError::NotFound);
        }

        let id = next_id(&mut state.next_movie_id);
        let now = Utc::now();
        state.movies.insert(
            id,
            Movie {
                id,
                title: movie.title.clone(),
                director: movie.director.clone(),
                release_date: movie.release_date,
                cast: movie.cast.clone(),
                genre: movie.genre.clone(),
                synopsis: movie.synopsis.clone(),
                user_id: owner,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: MovieId) -> Result<Movie, ApiError> {
        let state = self.state.lock().await;
        state.movies.get(&id).cloned().ok_or(ApiError::NotFound)
    }

    async fn get_with_author(&self, id: MovieId) -> Result<MovieWithAuthor, ApiError> {
        let state = self.state.lock().await;
        let movie = state.movies.get(&id).ok_or(ApiError::NotFound)?;
        let author = state.users.get(&movie.user_id).ok_or(ApiError::NotFound)?;

        Ok(MovieWithAuthor {
            created_by: CreatedBy {
                name: author.name.clone(),
                user_id: author.id,
            },
            movie: movie.clone(),
        })
    }

    async fn list(&self, filter: &MovieFilter) -> Result<Vec<Movie>, ApiError> {
        let state = self.state.lock().await;
        Ok(state
            .movies
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    async fn update(&self, movie: &Movie) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        if state
            .movies
            .values()
            .any(|m| m.id != movie.id && m.title == movie.title)
        {
            return Err(ApiError::DuplicateEntry);
        }

        let stored = state.movies.get_mut(&movie.id).ok_or(ApiError::NotFound)?;
        stored.title = movie.title.clone();
        stored.director = movie.director.clone();
        stored.release_date = movie.release_date;
        stored.cast = movie.cast.clone();
        stored.genre = movie.genre.clone();
        stored.synopsis = movie.synopsis.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: MovieId) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.movies.remove(&id).ok_or(ApiError::NotFound)?;
        state.favourites.retain(|_, (_, movie_id)| *movie_id != id);
        Ok(())
    }

    async fn count(&self) -> Result<i64, ApiError> {
        Ok(self.state.lock().await.movies.len() as i64)
    }
}

#[async_trait::async_trait]
impl FavouriteRepository for InMemoryStore {
    async fn insert(&self, user_id: UserId, movie_id: MovieId) -> Result<FavouriteId, ApiError> {
        let mut state = self.state.lock().await;
        if !state.movies.contains_key(&movie_id) || !state.users.contains_key(&user_id) {
            return Err(ApiError::NotFound);
        }
        if state
            .favourites
            .values()
            .any(|fav| *fav == (user_id, movie_id))
        {
            return Err(ApiError::DuplicateEntry);
        }

        let id = next_id(&mut state.next_favourite_id);
        state.favourites.insert(id, (user_id, movie_id));
        Ok(id)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<FavouriteMovie>, ApiError> {
        let state = self.state.lock().await;
        Ok(state
            .favourites
            .iter()
            .filter(|(_, (owner, _))| *owner == user_id)
            .filter_map(|(id, (_, movie_id))| {
                state.movies.get(movie_id).map(|movie| FavouriteMovie {
                    favourite_id: *id,
                    movie: movie.clone(),
                })
            })
            .collect())
    }

    async fn remove(&self, id: FavouriteId, user_id: UserId) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        let owned = state
            .favourites
            .get(&id)
            .is_some_and(|(owner, _)| *owner == user_id);
        if !owned {
            return Err(ApiError::NotFound);
        }

        state.favourites.remove(&id);
        Ok(())
    }
}
