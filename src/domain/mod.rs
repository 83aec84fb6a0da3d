mod subscriber;
mod subscriber_email;
mod subscription_result;
mod subscription_source;
// allow external `use` statements to skip `subscriber_email` etc
pub use subscriber::Subscriber;
pub use subscriber::SubscriptionTag;
pub use subscriber_email::SubscriberEmail;
pub use subscription_result::SubscriptionResult;
pub use subscription_source::SubscriptionSource;
