//! Nearest-branch geolocation state machine.
//!
//! The branch bar shows the head office until the visitor's location is
//! known, then the closest branch and its distance. Browser capabilities
//! (permission query, geolocation, local/session storage) are reported to the
//! machine as [`LocatorEvent`]s; the machine answers with [`LocatorCommand`]s
//! for the host to execute. Transitions never perform I/O.
//!
//! ```text
//!            mount(cache)            permission granted
//!   Idle ─────────────────► Cached ───────────────────► Fetching
//!    │ permission prompt                                  │   │
//!    ▼                       enable                       │   │ denied
//!   Prompting ───────────────────────────────────────────►│   ▼
//!                                         position        │  Denied
//!                                  Resolved ◄─────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::geo::{Coordinates, format_distance};
use crate::offices::{Office, OfficeContact, nearest_office};

/// How long a cached position stays usable.
pub const CACHE_TTL_MS: i64 = 30 * 60 * 1000;

/// Upper bound on a single position request.
pub const LOCATION_TIMEOUT_MS: u64 = 5_000;

/// Local storage key of the cached position.
pub const CACHE_KEY: &str = "tas_user_location";

/// Session storage key of the banner dismissal flag.
pub const DISMISS_KEY: &str = "locationBannerDismissed";

/// Position persisted in browser local storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CachedLocation {
    pub lat: f64,
    pub lng: f64,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl CachedLocation {
    #[must_use]
    pub const fn new(coordinates: Coordinates, timestamp: i64) -> Self {
        Self {
            lat: coordinates.lat,
            lng: coordinates.lng,
            timestamp,
        }
    }

    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    /// Whether the entry is younger than [`CACHE_TTL_MS`] at `now_ms`.
    #[must_use]
    pub const fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms - self.timestamp < CACHE_TTL_MS
    }
}

/// Result of the browser permission query for geolocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
}

/// Why a position request failed.
///
/// Deserializes from the numeric `GeolocationPositionError.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "u16")]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl PositionError {
    /// Map a numeric browser error code; unknown codes count as unavailable.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }
}

impl From<u16> for PositionError {
    fn from(code: u16) -> Self {
        Self::from_code(code)
    }
}

/// Phase of the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorState {
    /// Nothing known yet; the head office is shown.
    Idle,
    /// Showing the branch nearest to a cached position.
    Cached,
    /// Waiting for the visitor to opt in.
    Prompting,
    /// A position request is in flight.
    Fetching,
    /// Showing the branch nearest to a fresh position.
    Resolved,
    /// The visitor refused location access; never prompt again.
    Denied,
}

/// Input to the state machine.
///
/// On the wire: `{"type": "permission_resolved", "value": "granted"}`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LocatorEvent {
    /// The component mounted and read its storage and capabilities.
    Mounted {
        cached: Option<CachedLocation>,
        dismissed: bool,
        geolocation_available: bool,
        permissions_api: bool,
        now_ms: i64,
    },
    /// The permission query answered.
    PermissionResolved(PermissionState),
    /// The permission query itself threw.
    PermissionQueryFailed,
    /// The visitor pressed "Enable" on the banner.
    EnableRequested,
    /// The visitor closed the banner.
    Dismissed,
    /// A position request succeeded.
    PositionAcquired { coordinates: Coordinates, now_ms: i64 },
    /// A position request failed.
    PositionFailed(PositionError),
    /// The request deadline passed without an answer.
    TimedOut,
}

/// Side effect the host must perform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LocatorCommand {
    /// Ask the browser for the geolocation permission state.
    QueryPermission,
    /// Request one position, giving up after `timeout_ms`.
    FetchPosition { timeout_ms: u64, maximum_age_ms: i64 },
    /// Write the position to local storage under [`CACHE_KEY`].
    StoreCache(CachedLocation),
    /// Set the session flag under [`DISMISS_KEY`].
    RememberDismissal,
}

/// Closest branch to a known position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchFix {
    pub office: &'static Office,
    pub distance_km: f64,
}

/// What the branch bar should render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchView {
    /// Show the opt-in banner instead of the bar.
    pub show_prompt: bool,
    pub office: &'static Office,
    /// `None` hides the bar entirely.
    pub contact: Option<&'static OfficeContact>,
    /// `"2.4km away"` with a fix, `"Head Office"` without.
    pub distance_label: String,
    pub has_location: bool,
}

/// Nearest-branch lookup for one page view.
#[derive(Debug, Clone)]
pub struct Locator {
    offices: &'static [Office],
    fallback: &'static Office,
    state: LocatorState,
    /// State to return to when a fetch fails without a denial.
    resume: LocatorState,
    fix: Option<BranchFix>,
    has_cache: bool,
    dismissed: bool,
}

impl Locator {
    /// Create a locator over `offices`; the first office is the fallback.
    ///
    /// Returns `None` for an empty directory.
    #[must_use]
    pub fn new(offices: &'static [Office]) -> Option<Self> {
        let fallback = offices.first()?;
        Some(Self {
            offices,
            fallback,
            state: LocatorState::Idle,
            resume: LocatorState::Idle,
            fix: None,
            has_cache: false,
            dismissed: false,
        })
    }

    /// Rebuild a locator from every event of a page view, in order.
    ///
    /// Returns the locator and the commands produced by the last event.
    /// Transitions are pure, so the browser can keep the event log and have
    /// any process answer for it. `None` for an empty directory.
    #[must_use]
    pub fn replay(
        offices: &'static [Office],
        events: impl IntoIterator<Item = LocatorEvent>,
    ) -> Option<(Self, Vec<LocatorCommand>)> {
        let mut locator = Self::new(offices)?;
        let mut commands = Vec::new();
        for event in events {
            commands = locator.handle(event);
        }
        Some((locator, commands))
    }

    #[must_use]
    pub const fn state(&self) -> LocatorState {
        self.state
    }

    #[must_use]
    pub const fn fix(&self) -> Option<BranchFix> {
        self.fix
    }

    #[must_use]
    pub const fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Apply one event and return the effects to run.
    pub fn handle(&mut self, event: LocatorEvent) -> Vec<LocatorCommand> {
        match event {
            LocatorEvent::Mounted {
                cached,
                dismissed,
                geolocation_available,
                permissions_api,
                now_ms,
            } => self.on_mounted(
                cached.filter(|c| c.is_fresh(now_ms)),
                dismissed,
                geolocation_available,
                permissions_api,
            ),
            LocatorEvent::PermissionResolved(permission) => self.on_permission(permission),
            LocatorEvent::PermissionQueryFailed => {
                if self.has_cache {
                    self.begin_fetch()
                } else {
                    Vec::new()
                }
            }
            LocatorEvent::EnableRequested => {
                if matches!(self.state, LocatorState::Prompting) {
                    self.state = LocatorState::Idle;
                    self.begin_fetch()
                } else {
                    Vec::new()
                }
            }
            LocatorEvent::Dismissed => {
                self.dismissed = true;
                vec![LocatorCommand::RememberDismissal]
            }
            LocatorEvent::PositionAcquired {
                coordinates,
                now_ms,
            } => {
                if !matches!(self.state, LocatorState::Fetching) {
                    return Vec::new();
                }
                self.update_fix(coordinates);
                self.state = LocatorState::Resolved;
                vec![LocatorCommand::StoreCache(CachedLocation::new(
                    coordinates,
                    now_ms,
                ))]
            }
            LocatorEvent::PositionFailed(error) => {
                if matches!(self.state, LocatorState::Fetching) {
                    self.state = if error == PositionError::PermissionDenied {
                        LocatorState::Denied
                    } else {
                        self.resume
                    };
                }
                Vec::new()
            }
            LocatorEvent::TimedOut => {
                if matches!(self.state, LocatorState::Fetching) {
                    self.state = self.resume;
                }
                Vec::new()
            }
        }
    }

    /// Current rendering of the branch bar.
    #[must_use]
    pub fn view(&self) -> BranchView {
        let (office, distance_label) = match self.fix {
            Some(fix) => (fix.office, format_distance(fix.distance_km)),
            None => (self.fallback, "Head Office".to_owned()),
        };

        BranchView {
            show_prompt: self.banner_visible(),
            office,
            contact: office.primary_contact(),
            distance_label,
            has_location: self.fix.is_some(),
        }
    }

    /// The opt-in banner shows only while prompting, undismissed, without a fix.
    #[must_use]
    pub const fn banner_visible(&self) -> bool {
        matches!(self.state, LocatorState::Prompting) && !self.dismissed && self.fix.is_none()
    }

    fn on_mounted(
        &mut self,
        cached: Option<CachedLocation>,
        dismissed: bool,
        geolocation_available: bool,
        permissions_api: bool,
    ) -> Vec<LocatorCommand> {
        self.dismissed = dismissed;

        if let Some(cached) = cached {
            self.has_cache = true;
            self.update_fix(cached.coordinates());
            self.state = LocatorState::Cached;
        }

        if !geolocation_available {
            return Vec::new();
        }

        if permissions_api {
            vec![LocatorCommand::QueryPermission]
        } else if self.has_cache {
            self.begin_fetch()
        } else {
            Vec::new()
        }
    }

    fn on_permission(&mut self, permission: PermissionState) -> Vec<LocatorCommand> {
        match permission {
            PermissionState::Granted => self.begin_fetch(),
            PermissionState::Denied => {
                self.state = LocatorState::Denied;
                Vec::new()
            }
            PermissionState::Prompt => {
                if !self.has_cache {
                    self.state = LocatorState::Prompting;
                }
                Vec::new()
            }
        }
    }

    fn begin_fetch(&mut self) -> Vec<LocatorCommand> {
        if matches!(self.state, LocatorState::Fetching | LocatorState::Denied) {
            return Vec::new();
        }
        self.resume = self.state;
        self.state = LocatorState::Fetching;
        vec![LocatorCommand::FetchPosition {
            timeout_ms: LOCATION_TIMEOUT_MS,
            maximum_age_ms: CACHE_TTL_MS,
        }]
    }

    fn update_fix(&mut self, coordinates: Coordinates) {
        if let Some((office, distance_km)) = nearest_office(coordinates, self.offices) {
            self.fix = Some(BranchFix {
                office,
                distance_km,
            });
        }
    }
}
