//! Static branch directory used for nearest-branch lookup.

use serde::Serialize;

use crate::geo::{Coordinates, haversine_km};

/// A person customers can call at a branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OfficeContact {
    pub name: &'static str,
    pub phone: &'static str,
}

/// A physical branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Office {
    pub id: &'static str,
    pub name: &'static str,
    pub coordinates: Coordinates,
    pub contacts: &'static [OfficeContact],
}

impl Office {
    /// The contact shown in the branch bar, if any.
    #[must_use]
    pub fn primary_contact(&self) -> Option<&'static OfficeContact> {
        self.contacts.first()
    }
}

/// Every branch. The first entry is the head office and the default display.
pub static OFFICES: &[Office] = &[
    Office {
        id: "head-office",
        name: "Head Office - Secunderabad",
        coordinates: Coordinates::new(17.4399, 78.4983),
        contacts: &[OfficeContact {
            name: "Sales Desk",
            phone: "+919052772942",
        }],
    },
    Office {
        id: "branch-office",
        name: "Branch Office - Hyderabad",
        coordinates: Coordinates::new(17.3850, 78.4867),
        contacts: &[OfficeContact {
            name: "Branch Sales",
            phone: "+918008252786",
        }],
    },
    Office {
        id: "balanagar",
        name: "Balanagar Branch",
        coordinates: Coordinates::new(17.4705, 78.4463),
        contacts: &[OfficeContact {
            name: "Balanagar Sales",
            phone: "+919885216310",
        }],
    },
];

/// The head office, shown until a location fix is available.
#[must_use]
pub fn head_office() -> Option<&'static Office> {
    OFFICES.first()
}

/// Nearest office to `point` together with its distance in kilometres.
///
/// Returns `None` only when `offices` is empty. Ties keep the earlier office.
#[must_use]
pub fn nearest_office(point: Coordinates, offices: &[Office]) -> Option<(&Office, f64)> {
    offices
        .iter()
        .map(|office| (office, haversine_km(point, office.coordinates)))
        .fold(None, |best, candidate| match best {
            Some((_, best_km)) if best_km <= candidate.1 => best,
            _ => Some(candidate),
        })
}

/// Phone number as printed on the site, e.g. `+91 9052772942`.
#[must_use]
pub fn display_phone(phone: &str) -> String {
    match phone.strip_prefix("+91") {
        Some(rest) if rest.len() == 10 => format!("+91 {rest}"),
        _ => phone.to_owned(),
    }
}

/// WhatsApp deep link for a phone number with a pre-filled message.
///
/// ```
/// use tas_core::offices::whatsapp_link;
///
/// assert_eq!(
///     whatsapp_link("+91 90527 72942", "Hi there"),
///     "https://wa.me/919052772942?text=Hi%20there"
/// );
/// ```
#[must_use]
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let mut link = format!("https://wa.me/{digits}");
    if !message.is_empty() {
        link.push_str("?text=");
        link.extend(url::form_urlencoded::byte_serialize(message.as_bytes()).map(|chunk| {
            if chunk == "+" { "%20" } else { chunk }
        }));
    }
    link
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_office_has_a_contact() {
        assert!(OFFICES.iter().all(|o| o.primary_contact().is_some()));
    }

    #[test]
    fn test_head_office_is_first() {
        assert_eq!(head_office().unwrap().id, "head-office");
    }

    #[test]
    fn test_nearest_office_at_branch_location() {
        for office in OFFICES {
            let (nearest, km) = nearest_office(office.coordinates, OFFICES).unwrap();
            assert_eq!(nearest.id, office.id);
            assert!(km.abs() < 1e-9);
        }
    }

    #[test]
    fn test_nearest_office_is_idempotent() {
        let point = Coordinates::new(17.45, 78.47);
        let (first, first_km) = nearest_office(point, OFFICES).unwrap();
        let (second, second_km) = nearest_office(point, OFFICES).unwrap();
        assert_eq!(first.id, second.id);
        assert!((first_km - second_km).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_office_picks_minimum() {
        let point = Coordinates::new(17.48, 78.44);
        let (nearest, km) = nearest_office(point, OFFICES).unwrap();
        assert_eq!(nearest.id, "balanagar");
        for office in OFFICES {
            assert!(km <= haversine_km(point, office.coordinates));
        }
    }

    #[test]
    fn test_nearest_office_empty_directory() {
        assert!(nearest_office(Coordinates::new(0.0, 0.0), &[]).is_none());
    }

    #[test]
    fn test_display_phone() {
        assert_eq!(display_phone("+919052772942"), "+91 9052772942");
        assert_eq!(display_phone("040-2784 1234"), "040-2784 1234");
    }

    #[test]
    fn test_whatsapp_link_without_message() {
        assert_eq!(whatsapp_link("+91-80082 52786", ""), "https://wa.me/918008252786");
    }
}
