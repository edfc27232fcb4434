pub mod elements;
pub mod headless;
pub mod host;
pub mod style;

pub use elements::{ElementId, HeaderButton, HeaderLabels, PopupElements, PopupId, PopupPart};
pub use headless::{HeadlessHost, HeadlessMetrics};
pub use host::PopupHost;
pub use style::{ChromeOverrides, ChromeTokens, CHROME_TOKENS};
