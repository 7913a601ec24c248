//! The pattern table: every built-in detector, grouped by category.
//!
//! Detector definitions are static data. `PatternTable::builtin` compiles them
//! once; the resulting table is immutable and shared by reference (`Arc`)
//! with every rule family for the lifetime of a linter.

use crate::document::BlockTrigger;
use crate::error::ConfigError;
use crate::types::Category;
use regex::Regex;
use std::ops::Range;

/// Decorative emoji flagged at the start of list items
pub const LIST_EMOJIS: &[&str] = &[
    "✅", "❌", "⭐", "💡", "🔥", "📝", "⚡", "🎯", "🚀", "🎉", "📌", "🔍", "💰", "📊", "🔧",
    "⚠️", "❗", "💻", "📱", "🌟",
];

/// Bold informational labels such as `**注意**`
pub const INFO_LABELS: &[&str] = &[
    "注意",
    "重要",
    "ポイント",
    "メモ",
    "参考",
    "補足",
    "確認",
    "チェック",
    "推奨",
    "おすすめ",
    "検出される例",
    "推奨される表現",
    "良い例",
    "悪い例",
    "例",
    "サンプル",
    "使用例",
    "設定例",
];

const SYMBOL_EMPHASIS: &str =
    r"(ℹ️|🔍|✅|❌|⚠️|💡|📝|📋|📌|🔗|🎯|🚀|⭐|✨|💯|🔥|📊|📈)\s*\*\*([^*]+)\*\*";

#[derive(Debug, Clone, Copy)]
enum Source {
    Regex(&'static str),
    Literals(&'static [&'static str]),
    /// `\*\*(labels)([：:].*?)?\*\*`, assembled from INFO_LABELS
    InfoLabels,
    BlockAdjacency(&'static str, &'static [BlockTrigger]),
}

struct DetectorDef {
    id: &'static str,
    category: Category,
    source: Source,
    message: &'static str,
    enabled_by_default: bool,
}

const fn def(
    id: &'static str,
    category: Category,
    source: Source,
    message: &'static str,
    enabled_by_default: bool,
) -> DetectorDef {
    DetectorDef {
        id,
        category,
        source,
        message,
        enabled_by_default,
    }
}

/// Plain regex detector that is off unless its family is switched on
const fn phrase(
    id: &'static str,
    category: Category,
    pattern: &'static str,
    message: &'static str,
) -> DetectorDef {
    def(id, category, Source::Regex(pattern), message, false)
}

const ALL_TRIGGERS: &[BlockTrigger] = &[
    BlockTrigger::CodeBlock,
    BlockTrigger::List,
    BlockTrigger::Quote,
    BlockTrigger::Table,
];

// Message placeholders: {0} is the whole match, {1}.. are capture groups.
static DEFINITIONS: &[DetectorDef] = &[
    // ===== LIST FORMATTING =====
    def(
        "list-label-colon",
        Category::LabelColonList,
        Source::Regex(r"^\s*[-*+]\s+\*\*[^*]+\*\*\s*:"),
        "リストアイテムで強調（**）とコロン（:）の組み合わせは機械的な印象を与える可能性があります。より自然な表現を検討してください。",
        true,
    ),
    def(
        "list-decorative-emoji",
        Category::DecorativeSymbol,
        Source::Literals(LIST_EMOJIS),
        "リストアイテムでの絵文字「{0}」の使用は、読み手によっては機械的な印象を与える場合があります。テキストベースの表現も検討してみてください。",
        true,
    ),
    // ===== EMPHASIS =====
    def(
        "symbol-emphasis",
        Category::SymbolEmphasis,
        Source::Regex(SYMBOL_EMPHASIS),
        "絵文字と太字の組み合わせは機械的な印象を与える可能性があります。より自然な表現を検討してください。",
        false,
    ),
    def(
        "emphasis-info-label",
        Category::EmphasisLabel,
        Source::InfoLabels,
        "「**{1}**」のような太字の情報プレフィックスは機械的な印象を与える可能性があります。より自然な表現を検討してください。",
        false,
    ),
    def(
        "heading-emphasis",
        Category::HeadingEmphasis,
        Source::Regex(r"\*\*(.*?)\*\*|__(.*?)__"),
        "見出し内の太字は不要です。見出し自体が強調のため、追加の太字は冗長です。",
        false,
    ),
    // ===== FORMAL EXPRESSIONS =====
    def(
        "stock-phrase",
        Category::StockPhrase,
        Source::Regex(
            "以下のような|次のような点|具体的には以下の通りです|重要なポイントは以下です|主な特徴として|詳細については以下をご確認ください",
        ),
        "「{0}」のような定型的な表現は、読み手によっては機械的な印象を与える場合があります。より自然な表現も検討してみてください。",
        true,
    ),
    // ===== HYPE: ABSOLUTENESS =====
    phrase(
        "hype-revolutionary",
        Category::HypeAbsoluteness,
        "革命的な",
        "「革命的な」という表現は過度に誇張的である可能性があります。具体的な改善点を述べることを検討してください。",
    ),
    phrase(
        "hype-game-changer",
        Category::HypeAbsoluteness,
        "ゲームチェンジャー",
        "「ゲームチェンジャー」という表現は機械的な印象を与える可能性があります。具体的な変化を説明することを検討してください。",
    ),
    phrase(
        "hype-world-first",
        Category::HypeAbsoluteness,
        "世界初の",
        "「世界初の」という表現は過度に強調的である可能性があります。事実に基づいた表現を検討してください。",
    ),
    phrase(
        "hype-ultimate",
        Category::HypeAbsoluteness,
        "究極の",
        "「究極の」という表現は誇張的である可能性があります。より具体的で控えめな表現を検討してください。",
    ),
    phrase(
        "hype-completely",
        Category::HypeAbsoluteness,
        "完全に",
        "「完全に」という絶対的な表現は過度に断定的である可能性があります。「多くの場合」などの表現を検討してください。",
    ),
    phrase(
        "hype-everything",
        Category::HypeAbsoluteness,
        "すべて[をの]",
        "「すべて」という包括的な表現は過度に断定的である可能性があります。「多くの」や「主な」などの表現を検討してください。",
    ),
    phrase(
        "hype-perfect",
        Category::HypeAbsoluteness,
        "完璧な",
        "「完璧な」という表現は過度に理想化している可能性があります。具体的な利点を述べることを検討してください。",
    ),
    phrase(
        "hype-best",
        Category::HypeAbsoluteness,
        "最高の",
        "「最高の」という表現は主観的で誇張的である可能性があります。より客観的な評価を示すことを検討してください。",
    ),
    phrase(
        "hype-cutting-edge",
        Category::HypeAbsoluteness,
        "最先端の",
        "「最先端の」という表現は定型的である可能性があります。具体的な技術的特徴を説明することを検討してください。",
    ),
    // ===== HYPE: ABSTRACT =====
    phrase(
        "hype-like-magic",
        Category::HypeAbstract,
        "魔法のように",
        "「魔法のように」という比喩的表現は現実味に欠ける可能性があります。具体的な仕組みを説明することを検討してください。",
    ),
    phrase(
        "hype-miraculous",
        Category::HypeAbstract,
        "奇跡的な",
        "「奇跡的な」という表現は過度に感情的である可能性があります。具体的な成果を示すことを検討してください。",
    ),
    phrase(
        "hype-astonishing",
        Category::HypeAbstract,
        "驚異的な",
        "「驚異的な」という表現は誇張的である可能性があります。数値や事実に基づいた表現を検討してください。",
    ),
    phrase(
        "hype-unleash",
        Category::HypeAbstract,
        "可能性を解き放つ",
        "「可能性を解き放つ」という抽象的な表現は曖昧である可能性があります。具体的な利益を説明することを検討してください。",
    ),
    phrase(
        "hype-potential",
        Category::HypeAbstract,
        "潜在能力を引き出す",
        "「潜在能力を引き出す」という表現は抽象的である可能性があります。具体的な効果を説明することを検討してください。",
    ),
    phrase(
        "hype-democratize",
        Category::HypeAbstract,
        "民主化する",
        "「民主化する」という表現は技術文脈では曖昧である可能性があります。「利用しやすくする」などの具体的な表現を検討してください。",
    ),
    phrase(
        "hype-supercharge",
        Category::HypeAbstract,
        "スーパーチャージ",
        "「スーパーチャージ」という表現は機械的な印象を与える可能性があります。具体的な改善内容を説明することを検討してください。",
    ),
    phrase(
        "hype-amaze",
        Category::HypeAbstract,
        "驚嘆させ",
        "「驚嘆させる」という表現は過度に感情的である可能性があります。客観的な評価を示すことを検討してください。",
    ),
    // ===== HYPE: PREDICTIVE =====
    phrase(
        "hype-redefine-industry",
        Category::HypePredictive,
        "業界を再定義",
        "「業界を再定義する」という表現は誇張的である可能性があります。具体的な変化を説明することを検討してください。",
    ),
    phrase(
        "hype-change-future",
        Category::HypePredictive,
        "未来を変える",
        "「未来を変える」という表現は大げさである可能性があります。具体的な改善点を述べることを検討してください。",
    ),
    phrase(
        "hype-paradigm-shift",
        Category::HypePredictive,
        "パラダイムシフト",
        "「パラダイムシフト」という表現は定型的である可能性があります。具体的な変化を説明することを検討してください。",
    ),
    phrase(
        "hype-inevitable",
        Category::HypePredictive,
        "不可避の",
        "「不可避の」という表現は過度に断定的である可能性があります。「可能性が高い」などの表現を検討してください。",
    ),
    phrase(
        "hype-new-standard",
        Category::HypePredictive,
        "新たな基準を設定",
        "「新たな基準を設定」という表現は誇張的である可能性があります。具体的な改善内容を説明することを検討してください。",
    ),
    phrase(
        "hype-next-generation",
        Category::HypePredictive,
        "次世代の",
        "「次世代の」という表現は定型的である可能性があります。具体的な技術的進歩を説明することを検討してください。",
    ),
    phrase(
        "hype-frontier",
        Category::HypePredictive,
        "フロンティアを開拓",
        "「フロンティアを開拓」という比喩的表現は抽象的である可能性があります。具体的な取り組みを説明することを検討してください。",
    ),
    phrase(
        "hype-transform",
        Category::HypePredictive,
        "根本的に変革",
        "「根本的に変革」という表現は誇張的である可能性があります。具体的な変化を説明することを検討してください。",
    ),
    // ===== TECH WRITING: REDUNDANCY =====
    phrase(
        "redundant-first",
        Category::Redundancy,
        "まず最初に",
        "【簡潔性】冗長表現が検出されました。「まず最初に」→「まず」または「最初に」への簡潔化を検討してください。",
    ),
    phrase(
        "redundant-predict",
        Category::Redundancy,
        "あらかじめ予測",
        "【簡潔性】冗長表現が検出されました。「あらかじめ予測」→「予測」への簡潔化を検討してください。",
    ),
    phrase(
        "redundant-can-do",
        Category::Redundancy,
        "することができます",
        "【簡潔性】冗長な助動詞表現が検出されました。「できます」または「します」への簡潔化を検討してください。",
    ),
    phrase(
        "redundant-must-do",
        Category::Redundancy,
        "する必要があります",
        "【簡潔性】冗長な義務表現が検出されました。「してください」または「します」への直接的な表現を検討してください。",
    ),
    phrase(
        "redundant-needless-to-say",
        Category::Redundancy,
        "言うまでもなく",
        "【簡潔性】不要な前置き表現が検出されました。核心から始める簡潔な文章構成を検討してください。",
    ),
    // ===== TECH WRITING: VOICE =====
    phrase(
        "voice-is-performed",
        Category::Voice,
        "が行われ(て|る|ます)",
        "【明確性】受動的で抽象的な表現が検出されました。具体的な動詞を使った能動態への変更を検討してください（例：「実行する」「処理する」）。",
    ),
    phrase(
        "voice-make-change",
        Category::Voice,
        "の変更を行",
        "【明確性】名詞化された表現が検出されました。「を変更する」のような直接的な動詞表現を検討してください。",
    ),
    phrase(
        "voice-carry-out-implementation",
        Category::Voice,
        "の実装を実施",
        "【明確性】二重の名詞化表現が検出されました。「を実装する」への簡潔化を検討してください。",
    ),
    phrase(
        "voice-passive-by",
        Category::Voice,
        "によって[実行処理実施]され",
        "【明確性】受動態表現が検出されました。「○○が△△を実行する」のような能動態への変更を検討してください。",
    ),
    phrase(
        "voice-executed-by-system",
        Category::Voice,
        "がシステムによって実行される",
        "【明確性】受動態表現が検出されました。「システムが○○を実行する」のような能動態への変更を検討してください。",
    ),
    phrase(
        "voice-executed-by",
        Category::Voice,
        "によって実行され",
        "【明確性】受動態表現が検出されました。「システムが○○を実行する」のような能動態への変更を検討してください。",
    ),
    // ===== TECH WRITING: CLARITY =====
    phrase(
        "vague-fast",
        Category::Clarity,
        "高速な(?:パフォーマンス|処理|動作)",
        "【具体性】抽象的な性能表現が検出されました。具体的な数値基準の提示を検討してください（例：「50ms未満の応答時間」）。",
    ),
    phrase(
        "vague-significant",
        Category::Clarity,
        "大幅に(?:向上|改善|削減)",
        "【具体性】定量化されていない変化表現が検出されました。具体的な数値や割合の提示を検討してください。",
    ),
    phrase(
        "vague-efficient",
        Category::Clarity,
        "効率的な",
        "【具体性】抽象的な評価表現が検出されました。何に対してどのように効率的なのか、具体的な説明を検討してください。",
    ),
    phrase(
        "vague-appropriate",
        Category::Clarity,
        "適切な",
        "【具体性】曖昧な判断表現が検出されました。何を基準として適切なのか、具体的な条件や基準の明示を検討してください。",
    ),
    phrase(
        "vague-as-needed",
        Category::Clarity,
        "必要に応じて",
        "【具体性】曖昧な条件表現が検出されました。どのような状況で必要なのか、具体的な判断基準の明示を検討してください。",
    ),
    // ===== TECH WRITING: CONSISTENCY =====
    phrase(
        "mixed-user-terms",
        Category::Consistency,
        "(ユーザー.*?(?:クライアント|顧客))|(?:(?:クライアント|顧客).*?ユーザー)",
        "【一貫性】同一対象を指す用語の混在が検出されました。文書全体で統一した用語の使用を検討してください。",
    ),
    phrase(
        "mixed-settings-terms",
        Category::Consistency,
        "(設定画面.*?(?:設定ページ|環境設定))|(?:(?:設定ページ|環境設定).*?設定画面)",
        "【一貫性】機能名称の表記揺れが検出されました。プロジェクト内で統一した名称の使用を検討してください。",
    ),
    phrase(
        "mixed-register",
        Category::Consistency,
        "(です。.*?である。)|(である。.*?です。)",
        "【一貫性】文体の混在が検出されました。「です・ます調」または「だ・である調」への統一を検討してください。",
    ),
    // ===== TECH WRITING: STRUCTURE =====
    phrase(
        "repeated-also",
        Category::Structure,
        "また、.*?また、",
        "【構造化】接続表現の重複が検出されました。箇条書きや段落分けによる情報整理を検討してください。",
    ),
    phrase(
        "inline-steps",
        Category::Structure,
        "(?:第一に|まず).*?(?:第二に|次に).*?(?:第三に|最後に)",
        "【構造化】連続的な手順説明が検出されました。番号付きリストまたは見出し構造での整理を検討してください。",
    ),
    // ===== COLON CONTINUATION =====
    def(
        "colon-before-block",
        Category::ColonBeforeBlock,
        Source::BlockAdjacency(r"([：:])\s*$", ALL_TRIGGERS),
        "「{1}{2}」のような述語とコロンで終わるパターンは、読み手によっては英語の構文を直訳したような印象を与える場合があります。「〜を説明します。」「次のように〜します。」のような自然な日本語表現を検討してください。",
        false,
    ),
];

// ===== DETECTORS =====

#[derive(Debug, Clone)]
pub enum Matcher {
    Regex(Regex),
    /// Literal alternatives, longest first so a longer symbol wins at the
    /// same position
    Literals(Vec<&'static str>),
    /// Trailing-colon predicate plus the sibling kinds that make it fire
    BlockAdjacency {
        colon: Regex,
        triggers: &'static [BlockTrigger],
    },
}

#[derive(Debug, Clone, Copy)]
pub struct MessageTemplate(&'static str);

impl MessageTemplate {
    pub fn render<S: AsRef<str>>(&self, captures: &[S]) -> String {
        let mut message = self.0.to_string();
        for (index, capture) in captures.iter().enumerate() {
            message = message.replace(&format!("{{{index}}}"), capture.as_ref());
        }
        message
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// A matched span. `captures[0]` is the whole match; missing groups are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub range: Range<usize>,
    pub captures: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Detector {
    pub id: &'static str,
    pub category: Category,
    pub matcher: Matcher,
    pub message: MessageTemplate,
    pub enabled_by_default: bool,
}

impl Detector {
    /// Non-overlapping spans in text order
    pub fn find(&self, text: &str) -> Vec<Span> {
        match &self.matcher {
            Matcher::Regex(regex) => regex
                .captures_iter(text)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    if whole.is_empty() {
                        return None;
                    }
                    Some(Span {
                        range: whole.range(),
                        captures: caps
                            .iter()
                            .map(|group| group.map(|g| g.as_str().to_string()).unwrap_or_default())
                            .collect(),
                    })
                })
                .collect(),
            Matcher::Literals(literals) => find_literals(literals, text),
            Matcher::BlockAdjacency { colon, .. } => colon
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|mark| Span {
                    range: mark.range(),
                    captures: vec![mark.as_str().to_string()],
                })
                .into_iter()
                .collect(),
        }
    }

    pub fn message_for(&self, span: &Span) -> String {
        self.message.render(&span.captures)
    }

    pub fn triggers(&self) -> &'static [BlockTrigger] {
        match &self.matcher {
            Matcher::BlockAdjacency { triggers, .. } => triggers,
            Matcher::Regex(_) | Matcher::Literals(_) => &[],
        }
    }
}

fn find_literals(literals: &[&'static str], text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut position = 0;
    while position < text.len() {
        let rest = &text[position..];
        if let Some(literal) = literals.iter().find(|literal| rest.starts_with(**literal)) {
            spans.push(Span {
                range: position..position + literal.len(),
                captures: vec![literal.to_string()],
            });
            position += literal.len();
        } else {
            position += rest.chars().next().map(char::len_utf8).unwrap_or(1);
        }
    }
    spans
}

// ===== TABLE =====

#[derive(Debug, Clone)]
pub struct PatternTable {
    detectors: Vec<Detector>,
}

impl PatternTable {
    /// Compile the built-in catalogue.
    pub fn builtin() -> Result<Self, ConfigError> {
        let detectors = DEFINITIONS
            .iter()
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { detectors })
    }

    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    pub fn get(&self, id: &str) -> Option<&Detector> {
        self.detectors.iter().find(|detector| detector.id == id)
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Detector> {
        self.detectors
            .iter()
            .filter(move |detector| detector.category == category)
    }

    /// Detectors whose category is in `categories`, in table order
    pub fn select<'a>(&'a self, categories: &'a [Category]) -> impl Iterator<Item = &'a Detector> {
        self.detectors
            .iter()
            .filter(move |detector| categories.contains(&detector.category))
    }
}

fn compile(def: &DetectorDef) -> Result<Detector, ConfigError> {
    let regex = |pattern: &str| {
        Regex::new(pattern).map_err(|source| ConfigError::Detector {
            detector: def.id,
            source,
        })
    };
    let matcher = match def.source {
        Source::Regex(pattern) => Matcher::Regex(regex(pattern)?),
        Source::InfoLabels => {
            Matcher::Regex(regex(&format!(r"\*\*({})([：:].*?)?\*\*", INFO_LABELS.join("|")))?)
        }
        Source::Literals(literals) => {
            let mut literals = literals.to_vec();
            literals.sort_by_key(|literal| std::cmp::Reverse(literal.len()));
            Matcher::Literals(literals)
        }
        Source::BlockAdjacency(pattern, triggers) => Matcher::BlockAdjacency {
            colon: regex(pattern)?,
            triggers,
        },
    };
    Ok(Detector {
        id: def.id,
        category: def.category,
        matcher,
        message: MessageTemplate(def.message),
        enabled_by_default: def.enabled_by_default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PatternTable {
        PatternTable::builtin().expect("built-in patterns compile")
    }

    #[test]
    fn every_category_has_detectors() {
        let table = table();
        for category in [
            Category::DecorativeSymbol,
            Category::LabelColonList,
            Category::SymbolEmphasis,
            Category::EmphasisLabel,
            Category::HeadingEmphasis,
            Category::StockPhrase,
            Category::HypeAbsoluteness,
            Category::HypeAbstract,
            Category::HypePredictive,
            Category::Redundancy,
            Category::Voice,
            Category::Clarity,
            Category::Consistency,
            Category::Structure,
            Category::ColonBeforeBlock,
        ] {
            assert!(table.by_category(category).next().is_some(), "{category:?}");
        }
    }

    #[test]
    fn detector_ids_are_unique() {
        let table = table();
        let mut ids: Vec<_> = table.detectors().iter().map(|d| d.id).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len());
    }

    #[test]
    fn label_colon_matches_prefix_only() {
        let table = table();
        let detector = table.get("list-label-colon").unwrap();
        let spans = detector.find("- **重要**: これは重要な項目です");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].range, 0..13);
        assert!(detector.find("**強調テキスト**は問題ありません").is_empty());
    }

    #[test]
    fn literals_prefer_the_longest_symbol() {
        let table = table();
        let detector = table.get("list-decorative-emoji").unwrap();
        let spans = detector.find("- ⚠️ 注意 ✅");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].captures[0], "⚠️");
        assert_eq!(spans[0].range, 2..8);
        assert!(detector.find("- 😀 普通の笑顔").is_empty());
    }

    #[test]
    fn stock_phrase_message_carries_match() {
        let table = table();
        let detector = table.get("stock-phrase").unwrap();
        let spans = detector.find("手順は以下のような");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].range, 9..27);
        assert!(detector
            .message_for(&spans[0])
            .starts_with("「以下のような」のような定型的な表現"));
    }

    #[test]
    fn info_label_captures_prefix() {
        let table = table();
        let detector = table.get("emphasis-info-label").unwrap();
        let spans = detector.find("**注意：重要な点** を確認");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].captures[1], "注意");
        assert!(detector.message_for(&spans[0]).starts_with("「**注意**」"));
    }

    #[test]
    fn heading_emphasis_handles_both_markers() {
        let table = table();
        let detector = table.get("heading-emphasis").unwrap();
        assert_eq!(detector.find("## **重要** な __設定__").len(), 2);
    }

    #[test]
    fn trailing_colon_is_found_at_end_only() {
        let table = table();
        let detector = table.get("colon-before-block").unwrap();
        let spans = detector.find("実行します：");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].range, 15..18);
        assert!(detector.find("時刻は 12:30 です").is_empty());
        assert_eq!(detector.triggers().len(), 4);
    }

    #[test]
    fn template_replaces_numbered_placeholders() {
        let template = MessageTemplate("「{1}{2}」です");
        assert_eq!(template.render(&["all", "実行", ":"]), "「実行:」です");
    }
}
