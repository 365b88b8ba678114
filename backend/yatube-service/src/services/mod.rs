/// Business logic
///
/// Services take the viewer and the request scope and return plain data;
/// the HTTP layer only adapts them.
pub mod comments;
pub mod feed;
pub mod groups;
pub mod pagination;
pub mod posts;
pub mod relations;
pub mod users;

pub use comments::{CommentForm, CommentService};
pub use feed::{FeedService, GroupFeed, ProfileFeed};
pub use groups::{GroupForm, GroupService};
pub use pagination::{parse_page, Page, Paginator};
pub use posts::{PostDetail, PostForm, PostPatch, PostService};
pub use relations::RelationService;
pub use users::{SignupForm, UserService};
