use diesel::{dsl, BoolExpressionMethods, ExpressionMethods, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::db::{DaoError, DbThreadPool};
use crate::models::user::{NewUser, User, UserProfile};
use crate::request_io::{InputNewUser, InputOnboarding};
use crate::schema::friendships as friendship_fields;
use crate::schema::friendships::dsl::friendships;
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn get_user_by_id(&self, user_id: Uuid) -> Result<User, DaoError> {
        Ok(users
            .find(user_id)
            .first::<User>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn get_user_by_email(&self, user_email: &str) -> Result<User, DaoError> {
        Ok(users
            .filter(user_fields::email.eq(user_email.to_lowercase()))
            .first::<User>(&mut self.db_thread_pool.get()?)?)
    }

    /// The password is hashed by the caller; the DAO only ever sees the hash.
    /// New accounts start un-onboarded with an empty profile.
    pub fn create_user(
        &self,
        user_data: &InputNewUser,
        password_hash: &str,
        profile_pic: &str,
    ) -> Result<User, DaoError> {
        let current_time = chrono::Utc::now().naive_utc();

        let new_user = NewUser {
            id: Uuid::now_v7(),
            email: &user_data.email.to_lowercase(),
            password_hash,
            full_name: &user_data.full_name,
            bio: "",
            native_language: "",
            learning_language: "",
            location: "",
            profile_pic,
            is_onboarded: false,
            created_timestamp: current_time,
            modified_timestamp: current_time,
        };

        Ok(dsl::insert_into(users)
            .values(&new_user)
            .get_result::<User>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn update_onboarding(
        &self,
        user_id: Uuid,
        profile_data: &InputOnboarding,
    ) -> Result<User, DaoError> {
        Ok(
            dsl::update(users.filter(user_fields::id.eq(user_id)))
                .set((
                    user_fields::full_name.eq(&profile_data.full_name),
                    user_fields::bio.eq(&profile_data.bio),
                    user_fields::native_language.eq(&profile_data.native_language),
                    user_fields::learning_language.eq(&profile_data.learning_language),
                    user_fields::location.eq(&profile_data.location),
                    user_fields::is_onboarded.eq(true),
                    user_fields::modified_timestamp.eq(chrono::Utc::now().naive_utc()),
                ))
                .get_result::<User>(&mut self.db_thread_pool.get()?)?,
        )
    }

    /// Candidates for a new friend request: everyone except the requester,
    /// the requester's friends, and accounts that haven't finished
    /// onboarding. Storage order; no ranking.
    pub fn get_recommended_users(&self, user_id: Uuid) -> Result<Vec<UserProfile>, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        let friend_ids = friendships
            .filter(
                friendship_fields::user1_id
                    .eq(user_id)
                    .or(friendship_fields::user2_id.eq(user_id)),
            )
            .select((friendship_fields::user1_id, friendship_fields::user2_id))
            .load::<(Uuid, Uuid)>(&mut db_connection)?
            .into_iter()
            .map(|(user1_id, user2_id)| if user1_id == user_id { user2_id } else { user1_id })
            .collect::<Vec<_>>();

        Ok(users
            .filter(user_fields::id.ne(user_id))
            .filter(user_fields::id.ne_all(friend_ids))
            .filter(user_fields::is_onboarded.eq(true))
            .order(user_fields::created_timestamp.asc())
            .select((
                user_fields::id,
                user_fields::full_name,
                user_fields::bio,
                user_fields::native_language,
                user_fields::learning_language,
                user_fields::location,
                user_fields::profile_pic,
            ))
            .load::<UserProfile>(&mut db_connection)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::test_utils;
    use crate::db::{friendship, DaoError};

    #[test]
    fn test_create_user_lowercases_email_and_defaults_profile() {
        let user_dao = Dao::new(test_utils::db_thread_pool());

        let email = test_utils::unique_email().to_uppercase();
        let input = InputNewUser {
            full_name: String::from("Ada Lovelace"),
            email: email.clone(),
            password: String::from("unused-here"),
        };

        let created = user_dao
            .create_user(&input, "some_password_hash", "https://avatars.lingo.test/7.png")
            .unwrap();

        assert_eq!(created.email, email.to_lowercase());
        assert_eq!(created.full_name, "Ada Lovelace");
        assert_eq!(created.password_hash, "some_password_hash");
        assert!(!created.is_onboarded);
        assert!(created.bio.is_empty());
    }

    #[test]
    fn test_get_user_by_email_is_case_insensitive() {
        let user_dao = Dao::new(test_utils::db_thread_pool());
        let test_user = test_utils::create_test_user(&user_dao);

        let found = user_dao
            .get_user_by_email(&test_user.email.to_uppercase())
            .unwrap();
        assert_eq!(found.id, test_user.id);

        let missing = user_dao.get_user_by_email(&test_utils::unique_email());
        assert!(matches!(
            missing,
            Err(DaoError::QueryFailure(diesel::result::Error::NotFound))
        ));
    }

    #[test]
    fn test_update_onboarding_sets_flag_and_profile() {
        let user_dao = Dao::new(test_utils::db_thread_pool());

        let input = InputNewUser {
            full_name: String::from("Before Onboarding"),
            email: test_utils::unique_email(),
            password: String::from("unused-here"),
        };
        let created = user_dao
            .create_user(&input, "some_password_hash", "https://avatars.lingo.test/9.png")
            .unwrap();

        let updated = user_dao
            .update_onboarding(
                created.id,
                &InputOnboarding {
                    full_name: String::from("After Onboarding"),
                    bio: String::from("Learning languages"),
                    native_language: String::from("French"),
                    learning_language: String::from("Japanese"),
                    location: String::from("Lyon"),
                },
            )
            .unwrap();

        assert!(updated.is_onboarded);
        assert_eq!(updated.full_name, "After Onboarding");
        assert_eq!(updated.native_language, "French");
        assert_eq!(updated.learning_language, "Japanese");

        let missing = user_dao.update_onboarding(
            Uuid::now_v7(),
            &InputOnboarding {
                full_name: String::from("Nobody"),
                bio: String::from("-"),
                native_language: String::from("-"),
                learning_language: String::from("-"),
                location: String::from("-"),
            },
        );
        assert!(matches!(
            missing,
            Err(DaoError::QueryFailure(diesel::result::Error::NotFound))
        ));
    }

    #[test]
    fn test_get_recommended_users_exclusions() {
        let user_dao = Dao::new(test_utils::db_thread_pool());
        let friendship_dao = friendship::Dao::new(test_utils::db_thread_pool());

        let requester = test_utils::create_test_user(&user_dao);
        let friend = test_utils::create_test_user(&user_dao);
        let stranger = test_utils::create_test_user(&user_dao);

        let not_onboarded = user_dao
            .create_user(
                &InputNewUser {
                    full_name: String::from("Not Onboarded"),
                    email: test_utils::unique_email(),
                    password: String::from("unused-here"),
                },
                "some_password_hash",
                "https://avatars.lingo.test/3.png",
            )
            .unwrap();

        friendship_dao
            .add_friendship(requester.id, friend.id)
            .unwrap();

        let recommended_ids = user_dao
            .get_recommended_users(requester.id)
            .unwrap()
            .into_iter()
            .map(|profile| profile.id)
            .collect::<Vec<_>>();

        assert!(recommended_ids.contains(&stranger.id));
        assert!(!recommended_ids.contains(&requester.id));
        assert!(!recommended_ids.contains(&friend.id));
        assert!(!recommended_ids.contains(&not_onboarded.id));
    }
}
