/// Presentation-facing game views and mutation requests.
pub mod game;
