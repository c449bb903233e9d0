//! Request URL construction for the device protocol.

use reqwest::Url;

use crate::protocol_constants::{DELAY_MS_PARAM, HEALTH_CHECK_PATH, SOUND_NAME_PARAM};
use crate::registry::Device;

/// Returns `<base>health_check/`, adding a `/` after a base path without one.
#[must_use]
pub fn health_check_url(device: &Device) -> Url {
    let mut url = device.base_url.clone();
    let base = url.path();
    let separator = if base.ends_with('/') { "" } else { "/" };
    let path = format!("{}{}{}", base, separator, HEALTH_CHECK_PATH);
    url.set_path(&path);
    url.set_query(None);
    url
}

/// Returns `<base>?sound_name=<name>&delay_ms=<delay>`.
#[must_use]
pub fn play_url(device: &Device, sound_name: &str, delay_ms: u64) -> Url {
    let mut url = device.base_url.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair(SOUND_NAME_PARAM, sound_name)
        .append_pair(DELAY_MS_PARAM, &delay_ms.to_string());
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Credentials;

    fn device(url: &str) -> Device {
        Device::new("hall", url, Credentials::new("u", "p")).unwrap()
    }

    #[test]
    fn health_check_url_appends_path() {
        assert_eq!(
            health_check_url(&device("http://10.0.0.5:8000/")).as_str(),
            "http://10.0.0.5:8000/health_check/"
        );
        assert_eq!(
            health_check_url(&device("http://10.0.0.5:8000/agent")).as_str(),
            "http://10.0.0.5:8000/agent/health_check/"
        );
    }

    #[test]
    fn play_url_carries_sound_and_delay() {
        let url = play_url(&device("http://10.0.0.5:8000/"), "chime.mp3", 70);
        assert_eq!(
            url.as_str(),
            "http://10.0.0.5:8000/?sound_name=chime.mp3&delay_ms=70"
        );
    }

    #[test]
    fn play_url_keeps_configured_path() {
        let url = play_url(&device("http://10.0.0.5:8000/agent"), "chime.mp3", 0);
        assert_eq!(
            url.as_str(),
            "http://10.0.0.5:8000/agent?sound_name=chime.mp3&delay_ms=0"
        );
        let url = play_url(&device("http://10.0.0.5:8000/agent/"), "chime.mp3", 0);
        assert_eq!(
            url.as_str(),
            "http://10.0.0.5:8000/agent/?sound_name=chime.mp3&delay_ms=0"
        );
    }

    #[test]
    fn play_url_encodes_sound_name() {
        let url = play_url(&device("http://10.0.0.5/"), "morning song&more.mp3", 0);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0].1, "morning song&more.mp3");
        assert_eq!(pairs[1], ("delay_ms".to_string(), "0".to_string()));
    }
}
