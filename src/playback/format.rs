/// Format seconds as `M:SS`. Minutes are unbounded; unknown (non-finite) or
/// negative values render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Icon shown next to an item's volume.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VolumeIcon {
    Muted,
    Low,
    High,
}

impl VolumeIcon {
    pub fn for_volume(volume: f32) -> Self {
        if volume <= 0.0 {
            Self::Muted
        } else if volume < 0.5 {
            Self::Low
        } else {
            Self::High
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Muted => "🔇",
            Self::Low => "🔉",
            Self::High => "🔊",
        }
    }
}
