//! Разбор текста реплики в описание миниатюры

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::vtt::Cue;

/// Маркер спрайт-региона в тексте реплики
const XYWH_MARKER: &str = "#xywh=";

lazy_static! {
    static ref XYWH: Regex = Regex::new(r"^\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*$").unwrap();
}

/// Прямоугольник внутри спрайт-листа, px
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl SpriteRegion {
    /// Разобрать `x,y,w,h`; `None` для любого некорректного значения
    pub fn parse(text: &str) -> Option<Self> {
        let captures = XYWH.captures(text)?;
        Some(Self {
            x: captures[1].parse().ok()?,
            y: captures[2].parse().ok()?,
            w: captures[3].parse().ok()?,
            h: captures[4].parse().ok()?,
        })
    }
}

/// Описание миниатюры: URL изображения и, опционально, регион спрайта
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailDescriptor {
    pub src: String,
    pub region: Option<SpriteRegion>,
}

impl ThumbnailDescriptor {
    /// Есть ли что показывать
    pub fn has_image(&self) -> bool {
        !self.src.is_empty()
    }
}

/// Разбор текста реплики: `<url>` или `<url>#xywh=x,y,w,h`
///
/// Некорректный регион не считается ошибкой: показывается всё изображение.
pub fn parse_vtt_cue(cue: &Cue) -> ThumbnailDescriptor {
    parse_payload(&cue.text)
}

/// То же, что [`parse_vtt_cue`], но для сырого текста
pub fn parse_payload(payload: &str) -> ThumbnailDescriptor {
    match payload.split_once(XYWH_MARKER) {
        Some((url, region)) => {
            let region = SpriteRegion::parse(region);
            if region.is_none() {
                log::debug!("Ignoring malformed sprite region in '{}'", payload);
            }
            ThumbnailDescriptor {
                src: clean_url(url),
                region,
            }
        }
        None => ThumbnailDescriptor {
            src: clean_url(payload),
            region: None,
        },
    }
}

/// Разрешает относительный `src` относительно URL VTT файла
///
/// Если `base` не абсолютный URL или `src` уже абсолютный, `src` возвращается как есть.
pub fn resolve_src(base: &str, src: &str) -> String {
    if src.is_empty() || reqwest::Url::parse(src).is_ok() {
        return src.to_string();
    }
    match reqwest::Url::parse(base).and_then(|base| base.join(src)) {
        Ok(url) => url.to_string(),
        Err(_) => src.to_string(),
    }
}

/// Удаляет пробелы и переводы строк из URL
fn clean_url(url: &str) -> String {
    url.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_payload() {
        let descriptor = parse_payload("thumb.jpg#xywh=10,20,100,50");

        assert_eq!(descriptor.src, "thumb.jpg");
        assert_eq!(
            descriptor.region,
            Some(SpriteRegion { x: 10, y: 20, w: 100, h: 50 })
        );
    }

    #[test]
    fn test_plain_payload() {
        let descriptor = parse_payload("thumb.jpg");

        assert_eq!(descriptor.src, "thumb.jpg");
        assert_eq!(descriptor.region, None);
    }

    #[test]
    fn test_malformed_region() {
        for payload in [
            "thumb.jpg#xywh=bad",
            "thumb.jpg#xywh=1,2,3",
            "thumb.jpg#xywh=1,2,3,4,5",
            "thumb.jpg#xywh=-1,2,3,4",
            "thumb.jpg#xywh=1.5,2,3,4",
            "thumb.jpg#xywh=99999999999,0,1,1",
        ] {
            let descriptor = parse_payload(payload);
            assert_eq!(descriptor.src, "thumb.jpg", "payload {}", payload);
            assert_eq!(descriptor.region, None, "payload {}", payload);
        }
    }

    #[test]
    fn test_whitespace_in_url_is_removed() {
        let cue = Cue::new(0.0, 1.0, "  https://cdn.example.com/\nsprite.jpg #xywh=0,0,160,90");
        let descriptor = parse_vtt_cue(&cue);

        assert_eq!(descriptor.src, "https://cdn.example.com/sprite.jpg");
        assert_eq!(descriptor.region.map(|r| r.w), Some(160));
    }

    #[test]
    fn test_empty_payload() {
        let descriptor = parse_payload("");

        assert!(!descriptor.has_image());
        assert_eq!(descriptor.region, None);
    }

    #[test]
    fn test_resolve_src() {
        let base = "https://cdn.example.com/videos/42/thumbs.vtt";

        assert_eq!(
            resolve_src(base, "sprite-0.jpg"),
            "https://cdn.example.com/videos/42/sprite-0.jpg"
        );
        assert_eq!(
            resolve_src(base, "/static/a.jpg"),
            "https://cdn.example.com/static/a.jpg"
        );
        assert_eq!(
            resolve_src(base, "https://img.example.org/a.jpg"),
            "https://img.example.org/a.jpg"
        );
        assert_eq!(resolve_src("thumbs.vtt", "a.jpg"), "a.jpg");
        assert_eq!(resolve_src(base, ""), "");
    }

    #[test]
    fn test_only_first_marker_splits() {
        let descriptor = parse_payload("a.jpg#xywh=1,2,3,4#xywh=5,6,7,8");

        assert_eq!(descriptor.src, "a.jpg");
        assert_eq!(descriptor.region, None);
    }
}
