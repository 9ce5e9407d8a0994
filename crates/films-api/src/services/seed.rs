//! Reference data for an empty database.
//!
//! Users and movies are seeded independently, each only when its table is
//! empty. Seeded movies belong to `test1`.

use crate::crypto;
use crate::errors::ApiError;
use crate::models::NewMovie;
use crate::repositories::{MovieRepository, UserRepository};
use chrono::NaiveDate;
use tracing::instrument;

/// Password shared by every seeded user.
pub const SEED_PASSWORD: &str = "Test.1234";

/// Owner of the seeded movies.
pub const SEED_OWNER: &str = "test1";

pub const SEED_USERS: [&str; 3] = [SEED_OWNER, "test2", "test3"];

struct SeedMovie {
    title: &'static str,
    director: &'static str,
    released: (i32, u32, u32),
    cast: [&'static str; 3],
    genre: &'static str,
    synopsis: &'static str,
}

const SEED_MOVIES: [SeedMovie; 5] = [
    SeedMovie {
        title: "Inception",
        director: "Christopher Nolan",
        released: (2010, 7, 16),
        cast: ["Leonardo DiCaprio", "Joseph Gordon-Levitt", "Ellen Page"],
        genre: "Science Fiction",
        synopsis: "A thief who enters the dreams of others to steal their secrets.",
    },
    SeedMovie {
        title: "Interstellar",
        director: "Christopher Nolan",
        released: (2014, 10, 26),
        cast: ["Matthew McConaughey", "Anne Hathaway", "Jessica Chastain"],
        genre: "Science Fiction",
        synopsis: "A group of explorers travels through a wormhole in space in an attempt to ensure humanity's survival.",
    },
    SeedMovie {
        title: "The Dark Knight",
        director: "Christopher Nolan",
        released: (2008, 7, 18),
        cast: ["Christian Bale", "Heath Ledger", "Aaron Eckhart"],
        genre: "Action",
        synopsis: "Batman faces the Joker in a battle for Gotham City.",
    },
    SeedMovie {
        title: "The Matrix",
        director: "Lana Wachowski, Lilly Wachowski",
        released: (1999, 3, 31),
        cast: ["Keanu Reeves", "Laurence Fishburne", "Carrie-Anne Moss"],
        genre: "Science Fiction",
        synopsis: "A computer hacker learns about the true nature of his reality.",
    },
    SeedMovie {
        title: "Pulp Fiction",
        director: "Quentin Tarantino",
        released: (1994, 5, 21),
        cast: ["John Travolta", "Samuel L. Jackson", "Uma Thurman"],
        genre: "Crime",
        synopsis: "Various interconnected stories of crime in Los Angeles.",
    },
];

/// Populate empty tables with the reference users and movies.
#[instrument(skip_all, name = "films.service.seed")]
pub async fn seed_database(
    users: &dyn UserRepository,
    movies: &dyn MovieRepository,
    bcrypt_cost: u32,
) -> Result<(), ApiError> {
    if users.count().await? == 0 {
        tracing::info!(target: "films.seed", "Populating users");
        let password_hash = crypto::hash_password(SEED_PASSWORD, bcrypt_cost)?;
        for name in SEED_USERS {
            users.insert(name, &password_hash).await?;
        }
    }

    if movies.count().await? == 0 {
        let Some(owner) = users.get_by_name(SEED_OWNER).await? else {
            tracing::warn!(target: "films.seed", "Seed owner missing, skipping movies");
            return Ok(());
        };

        tracing::info!(target: "films.seed", "Populating movies");
        for seed in &SEED_MOVIES {
            let (year, month, day) = seed.released;
            let release_date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| ApiError::Internal(format!("Invalid seed date for {}", seed.title)))?;

            let movie = NewMovie {
                title: seed.title.to_string(),
                director: seed.director.to_string(),
                release_date,
                cast: seed.cast.iter().map(|s| s.to_string()).collect(),
                genre: seed.genre.to_string(),
                synopsis: seed.synopsis.to_string(),
            };
            movies.insert(&movie, owner.id).await?;
        }
    }

    Ok(())
}
