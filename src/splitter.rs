//! Multi-strategy day splitter shared by every parser plugin.
//!
//! The cascade tries, in order: grouped `Day N-M` headers, single-day
//! markers, blank-line paragraphs, and finally an even character split. The
//! first strategy that yields at least `total_days` chunks wins. Output
//! length is always in `[1, total_days]` and never empty for non-empty
//! input. Chunks are contiguous substrings of the input; cuts land on char
//! boundaries and are snapped to sentence/newline/bullet breaks so no word
//! is ever severed.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static GROUP_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)(?:^|\n)\s*(?:Day\s*(\d+)\s*-\s*(\d+)|第(\d+)-(\d+)天)[：:\s]?")
        .expect("group header regex")
});
static SINGLE_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)(?:^|\n)\s*(?:Day\s*\d+|第\s*\d+\s*天)[：:\s]").expect("single day regex")
});
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\s*[、.]\s*").expect("numbered item regex"));
static CJK_NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*[一二三四五六七八九十]+\s*[、.]\s*").expect("cjk numbered regex")
});
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-•*]\s+").expect("bullet regex"));
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph break regex"));

/// Split raw itinerary text into one chunk per day.
pub fn split_days(content: &str, total_days: u32) -> Vec<String> {
    let total_days = total_days.max(1) as usize;
    if content.trim().is_empty() {
        return Vec::new();
    }

    if let Some(chunks) = split_grouped(content, total_days) {
        debug!(target: "timeline::splitter", strategy = "grouped", chunks = chunks.len());
        return chunks;
    }
    if let Some(chunks) = split_single_markers(content, total_days) {
        debug!(target: "timeline::splitter", strategy = "markers", chunks = chunks.len());
        return chunks;
    }
    if let Some(chunks) = split_paragraphs(content, total_days) {
        debug!(target: "timeline::splitter", strategy = "paragraphs", chunks = chunks.len());
        return chunks;
    }
    let chunks = proportional_split(content, total_days);
    debug!(target: "timeline::splitter", strategy = "even", chunks = chunks.len());
    chunks
}

/// Strategy A: grouped "Day N-M" / "第N-M天" headers. Each group body is
/// sub-split into its day count; when the groups cover fewer days than
/// requested, the trailing region also absorbs the remaining day slots.
fn split_grouped(content: &str, total_days: usize) -> Option<Vec<String>> {
    struct Group {
        days: usize,
        body_start: usize,
        body_end: usize,
    }

    let mut groups = Vec::new();
    let matches: Vec<_> = GROUP_HEADER.captures_iter(content).collect();
    if matches.is_empty() {
        return None;
    }

    for (i, caps) in matches.iter().enumerate() {
        let whole = caps.get(0).expect("regex match");
        let start_day: usize = caps
            .get(1)
            .or_else(|| caps.get(3))
            .and_then(|m| m.as_str().parse().ok())?;
        let end_day: usize = caps
            .get(2)
            .or_else(|| caps.get(4))
            .and_then(|m| m.as_str().parse().ok())?;
        if end_day < start_day {
            return None;
        }
        let body_end = matches
            .get(i + 1)
            .map(|next| next.get(0).expect("regex match").start())
            .unwrap_or(content.len());
        groups.push(Group {
            days: end_day - start_day + 1,
            body_start: whole.end(),
            body_end,
        });
    }

    let group_days: usize = groups.iter().map(|g| g.days).sum();
    // Day slots not covered by any group are fed from the last region.
    let leftover = total_days.saturating_sub(group_days);

    let mut chunks = Vec::new();
    let last = groups.len() - 1;
    for (i, group) in groups.iter().enumerate() {
        let body = &content[group.body_start..group.body_end];
        let parts = if i == last { group.days + leftover } else { group.days };
        chunks.extend(split_group_body(body, parts));
        if chunks.len() >= total_days {
            break;
        }
    }

    chunks.truncate(total_days);
    chunks.retain(|c| !c.trim().is_empty());
    if chunks.len() >= total_days {
        Some(chunks)
    } else {
        None
    }
}

/// Sub-split one group body into `parts` chunks: bullet blocks first,
/// blank-line paragraphs second, proportional snap split last.
fn split_group_body(body: &str, parts: usize) -> Vec<String> {
    if parts <= 1 {
        return vec![body.to_string()];
    }

    let bullet_starts: Vec<usize> = BULLET.find_iter(body).map(|m| m.start()).collect();
    if bullet_starts.len() >= parts {
        return slice_at_boundaries(body, &bullet_starts, parts);
    }

    let paragraph_starts: Vec<usize> = PARAGRAPH_BREAK
        .find_iter(body)
        .map(|m| m.end())
        .filter(|&e| e < body.len())
        .collect();
    if paragraph_starts.len() + 1 >= parts {
        return slice_at_boundaries(body, &paragraph_starts, parts);
    }

    proportional_split(body, parts)
}

/// Slice `body` into `parts` contiguous chunks whose boundaries come from
/// `starts` (offsets of bullet/paragraph beginnings), distributed evenly.
fn slice_at_boundaries(body: &str, starts: &[usize], parts: usize) -> Vec<String> {
    // The first chunk always begins at 0 so any preamble is kept.
    let blocks = starts.len() + 1;
    let per_part = blocks.div_ceil(parts);
    let mut cuts = Vec::new();
    let mut block = per_part;
    while block <= starts.len() && cuts.len() < parts - 1 {
        cuts.push(starts[block - 1]);
        block += per_part;
    }

    let mut chunks = Vec::with_capacity(parts);
    let mut prev = 0;
    for cut in cuts {
        chunks.push(body[prev..cut].to_string());
        prev = cut;
    }
    chunks.push(body[prev..].to_string());
    chunks
}

/// Strategy B: single-day markers ("Day N", "第N天", numbered and Chinese
/// numbered list items). Requires at least `total_days` matches.
fn split_single_markers(content: &str, total_days: usize) -> Option<Vec<String>> {
    for pattern in [&*SINGLE_DAY, &*NUMBERED_ITEM, &*CJK_NUMBERED_ITEM] {
        let starts: Vec<usize> = pattern.find_iter(content).map(|m| m.start()).collect();
        if starts.len() >= total_days {
            let mut chunks = Vec::with_capacity(total_days);
            for i in 0..total_days {
                let start = starts[i];
                let end = if i + 1 < total_days {
                    starts[i + 1]
                } else {
                    content.len()
                };
                chunks.push(content[start..end].to_string());
            }
            return Some(chunks);
        }
    }
    None
}

/// Strategy C: blank-line-delimited blocks longer than 50 characters.
fn split_paragraphs(content: &str, total_days: usize) -> Option<Vec<String>> {
    let paragraphs: Vec<&str> = PARAGRAPH_BREAK
        .split(content)
        .map(str::trim)
        .filter(|p| p.chars().count() > 50)
        .collect();
    if paragraphs.len() >= total_days {
        Some(
            paragraphs
                .into_iter()
                .take(total_days)
                .map(str::to_string)
                .collect(),
        )
    } else {
        None
    }
}

/// Strategy D (also the shared proportional splitter): cut into `parts`
/// near-equal chunks, snapping each cut to the closest sentence end,
/// newline or bullet inside the tail of the chunk.
pub(crate) fn proportional_split(text: &str, parts: usize) -> Vec<String> {
    let mut chunks = Vec::with_capacity(parts);
    let mut rest = text;
    let mut remaining = parts;

    while remaining > 1 && !rest.is_empty() {
        let target = floor_char_boundary(rest, rest.len().div_ceil(remaining));
        let cut = snap_cut(rest, target);
        if cut == 0 || cut >= rest.len() {
            break;
        }
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
        remaining -= 1;
    }
    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks.retain(|c| !c.trim().is_empty());
    if chunks.is_empty() && !text.is_empty() {
        chunks.push(text.to_string());
    }
    chunks
}

/// Snap a prospective cut at byte `target` to the nearest sentence-end,
/// newline, bullet or space within the last ~30% of the chunk. Falls back
/// to the raw (char-aligned) target when no break is found.
fn snap_cut(text: &str, target: usize) -> usize {
    let window = &text[..target];
    let floor = target.saturating_mul(7) / 10;

    // Candidates carry the width added to keep the delimiter in the left
    // chunk; bullets start the right chunk instead. The bullet candidate is
    // anchored to a line start so a hyphen inside prose does not count.
    let candidates = [
        window.rfind('。').map(|i| i + '。'.len_utf8()),
        window.rfind('\n').map(|i| i + 1),
        window.rfind("\n- ").map(|i| i + 1),
        window.rfind(' ').map(|i| i + 1),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter(|&cut| cut >= floor && cut > 0 && cut <= target)
        .max()
        .unwrap_or(target)
}

/// Round a byte index down to the nearest char boundary.
fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_day_markers() {
        let content = "Day 1：参观故宫博物院和天安门广场\nDay 2：颐和园一日游\nDay 3：长城徒步";
        let chunks = split_days(content, 3);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].contains("故宫"));
        assert!(chunks[1].contains("颐和园"));
        assert!(chunks[2].contains("长城"));
    }

    #[test]
    fn test_chinese_day_markers() {
        let content = "第1天：市区漫步和美食探索\n第2天：博物馆与古迹参观";
        let chunks = split_days(content, 2);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("美食"));
    }

    #[test]
    fn test_numbered_markers() {
        let content = "1. 上午去外滩散步看江景\n2. 下午逛豫园和城隍庙\n3. 晚上南京路步行街";
        let chunks = split_days(content, 3);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_paragraph_fallback() {
        let first = "这一段描述了第一天的行程安排包括参观各种景点和品尝当地美食内容十分丰富多彩";
        let second = "这一段描述了第二天的行程安排包括自然风光徒步和夜市小吃体验也是非常充实的一天";
        let content = format!("{}\n\n{}", first, second);
        let chunks = split_days(&content, 2);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("第一天"));
        assert!(chunks[1].contains("第二天"));
    }

    #[test]
    fn test_even_split_never_mid_word() {
        let content = "morning walk around the lake. afternoon museum visit. evening food market tour.";
        let chunks = split_days(content, 2);
        assert_eq!(chunks.len(), 2);
        // cut lands after a sentence or space, so rejoining loses nothing
        assert_eq!(chunks.concat(), content);
        assert!(chunks[0].ends_with(' ') || chunks[0].ends_with('.') || chunks[0].ends_with('。'));
    }

    #[test]
    fn test_grouped_header_splits_body() {
        let sentence_a = "上午参观博物馆了解历史文化，中午在附近吃特色面条。";
        let sentence_b = "下午去湖边散步看风景，晚上回到酒店附近吃晚餐。";
        let content = format!("Day 1-2：{}{}", sentence_a, sentence_b);
        let chunks = split_days(&content, 2);
        assert_eq!(chunks.len(), 2);
        // chunks are substrings; combined they equal the group body
        assert_eq!(chunks.concat(), format!("{}{}", sentence_a, sentence_b));
        assert!(chunks[0].ends_with('。'));
    }

    #[test]
    fn test_grouped_header_with_bullets() {
        let content = "Day 1-2：\n- 参观故宫博物院看文物\n- 天安门广场和前门大街\n- 颐和园长廊与昆明湖\n- 清华北大校园漫步";
        let chunks = split_days(content, 2);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("故宫"));
        assert!(chunks[1].contains("颐和园") || chunks[1].contains("清华"));
    }

    #[test]
    fn test_output_bounds() {
        // fewer sentences than days still yields between 1 and total_days
        let chunks = split_days("只有一句话的行程。", 5);
        assert!(!chunks.is_empty());
        assert!(chunks.len() <= 5);

        assert!(split_days("", 3).is_empty());
        assert!(split_days("   \n ", 3).is_empty());
    }

    #[test]
    fn test_snap_cut_bullet_must_start_a_line() {
        // line-leading bullet: the cut starts the right chunk at "- "
        let bullets = "- 第一个景点的介绍\n- 第二个景点的介绍";
        let chunks = proportional_split(bullets, 2);
        assert_eq!(chunks.concat(), bullets);
        assert!(chunks[1].starts_with("- "));

        // hyphen inside prose is not a break; the cut snaps to the sentence
        let prose = "湖畔- 观景餐厅值得一去。回程再去老街走走看看夜景。";
        let chunks = proportional_split(prose, 2);
        assert_eq!(chunks.concat(), prose);
        assert!(chunks[0].ends_with('。'));
    }

    #[test]
    fn test_proportional_split_multibyte_safety() {
        // pure CJK text without separators must still cut on char boundaries
        let content = "故宫博物院天安门广场颐和园长城十三陵国家博物馆南锣鼓巷什刹海".repeat(3);
        let chunks = proportional_split(&content, 4);
        assert!(!chunks.is_empty());
        assert_eq!(chunks.concat(), content);
    }

    #[test]
    fn test_marker_priority_over_paragraphs() {
        let content = "Day 1：故宫和天安门，一整天都在市中心参观各种景点\n\nDay 2：颐和园和圆明园，主要看皇家园林风景";
        let chunks = split_days(content, 2);
        assert!(chunks[0].contains("Day 1"));
        assert!(chunks[1].contains("Day 2"));
    }
}
