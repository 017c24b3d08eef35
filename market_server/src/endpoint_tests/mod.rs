mod conversations;
mod helpers;
mod listings;
mod matches;
mod mocks;
mod notifications;
