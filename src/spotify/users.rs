use crate::{
    error::Result,
    spotify::{ApiClient, Query},
    types::User,
};

impl ApiClient {
    /// Profile of the user the token was issued for.
    pub async fn me(&self) -> Result<User> {
        self.get(&["me"], &Query::new()).await
    }
}
