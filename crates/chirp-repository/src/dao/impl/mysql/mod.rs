//! MySQL DAO implementations.

mod follow_dao_impl;
mod like_dao_impl;
mod search_dao_impl;
mod tweet_dao_impl;
mod user_dao_impl;

pub use follow_dao_impl::MySqlFollowDaoImpl;
pub use like_dao_impl::MySqlLikeDaoImpl;
pub use search_dao_impl::MySqlSearchDaoImpl;
pub use tweet_dao_impl::MySqlTweetDaoImpl;
pub use user_dao_impl::MySqlUserDaoImpl;
