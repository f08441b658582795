pub mod attendance;
pub mod caller;
pub mod class;
pub mod enums;
pub mod event;
pub mod ids;
pub mod io;
pub mod leaderboard;
pub mod progress;
pub mod session;
pub mod workout;

pub use attendance::*;
pub use caller::*;
pub use class::*;
pub use enums::*;
pub use event::*;
pub use ids::*;
pub use io::*;
pub use leaderboard::*;
pub use progress::*;
pub use session::*;
pub use workout::*;
