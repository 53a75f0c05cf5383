// matcher.rs — 分辨率匹配
// 为每组壁纸挑选最适合目标显示器的尺寸

/// 目标显示分辨率
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub width: u32,
    pub height: u32,
}

impl Target {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 理想宽高比
    fn ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// 同一张壁纸的某个尺寸（页面上的一个链接）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub width: u32,
    pub height: u32,
    pub link: String,
}

impl Candidate {
    pub fn new(width: u32, height: u32, link: impl Into<String>) -> Self {
        Self {
            width,
            height,
            link: link.into(),
        }
    }

    fn ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// 一组被选中的尺寸，结构和 Candidate 相同但语义不同：它已经满足最小尺寸约束
pub type Selection = Candidate;

/// 从一组候选中挑选最佳尺寸
///
/// - 宽或高小于目标的候选直接跳过
/// - 完全相等的候选立即返回，不再看后面的
/// - 否则取宽高比最接近目标的那个；距离相等时保留先出现的
/// - 初始的“最佳”相当于宽高比为 0，所以比例差不小于目标比例本身的候选永远选不上
///
/// 没有任何候选满足最小尺寸时返回 `None`。
pub fn select(target: Target, group: &[Candidate]) -> Option<Selection> {
    let ideal = target.ratio();
    let mut best: Option<&Candidate> = None;

    for candidate in group {
        if candidate.width < target.width || candidate.height < target.height {
            continue;
        }

        if candidate.width == target.width && candidate.height == target.height {
            return Some(candidate.clone());
        }

        let distance = (candidate.ratio() - ideal).abs();
        let improves = match best {
            None => distance < ideal,
            Some(current) => distance < (current.ratio() - ideal).abs(),
        };
        if improves {
            best = Some(candidate);
        }
    }

    best.cloned()
}

/// 对每组分别调用 [`select`]，丢弃没有结果的组
pub fn select_all<'a, I>(target: Target, groups: I) -> Vec<Selection>
where
    I: IntoIterator<Item = &'a [Candidate]>,
{
    groups
        .into_iter()
        .filter_map(|group| select(target, group))
        .collect()
}
