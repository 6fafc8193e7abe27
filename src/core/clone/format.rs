//! Audio container sniffing for uploaded voice samples.

/// A recognised sample container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub mime_type: &'static str,
    pub extension: &'static str,
}

const MP3: AudioFormat = AudioFormat {
    mime_type: "audio/mpeg",
    extension: "mp3",
};
const WAV: AudioFormat = AudioFormat {
    mime_type: "audio/wav",
    extension: "wav",
};
const M4A: AudioFormat = AudioFormat {
    mime_type: "audio/mp4",
    extension: "m4a",
};
const OGG: AudioFormat = AudioFormat {
    mime_type: "audio/ogg",
    extension: "ogg",
};
const FLAC: AudioFormat = AudioFormat {
    mime_type: "audio/flac",
    extension: "flac",
};

/// Detect audio format from magic bytes.
///
/// Returns `None` for anything that is not mp3, wav, m4a, ogg or flac.
pub fn detect_audio_format(data: &[u8]) -> Option<AudioFormat> {
    if data.len() < 12 {
        return None;
    }

    if data.starts_with(b"ID3") || (data[0] == 0xFF && (data[1] & 0xE0) == 0xE0) {
        return Some(MP3);
    }
    if data.starts_with(b"RIFF") && &data[8..12] == b"WAVE" {
        return Some(WAV);
    }
    if &data[4..8] == b"ftyp" {
        return Some(M4A);
    }
    if data.starts_with(b"OggS") {
        return Some(OGG);
    }
    if data.starts_with(b"fLaC") {
        return Some(FLAC);
    }

    None
}
