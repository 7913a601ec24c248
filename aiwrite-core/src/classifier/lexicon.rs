//! Built-in morphological lexicon.
//!
//! A dictionary-free segmenter for the one question the classifier asks:
//! what part of speech ends this fragment. Text is split into script runs;
//! hiragana is matched longest-first against a table of function words, and
//! leftover hiragana after a kanji stem is treated as okurigana.

use crate::error::TokenizeError;
use crate::types::{Morpheme, PartOfSpeech};
use async_trait::async_trait;

use super::tokenizer::Tokenizer;

use crate::types::PartOfSpeech::{
    Adjective as Adj, AuxiliaryVerb as Aux, Conjunction as Conj, Noun, Other, Particle, Verb,
};

/// Words that start with hiragana. Matched longest-first.
#[rustfmt::skip]
static FUNCTION_WORDS: &[(&str, PartOfSpeech)] = &[
    // particles
    ("が", Particle), ("を", Particle), ("に", Particle), ("へ", Particle), ("と", Particle),
    ("で", Particle), ("から", Particle), ("より", Particle), ("まで", Particle), ("の", Particle),
    ("は", Particle), ("も", Particle), ("や", Particle), ("か", Particle), ("ね", Particle),
    ("よ", Particle), ("ぞ", Particle), ("て", Particle), ("ば", Particle), ("けど", Particle),
    ("けれど", Particle), ("けれども", Particle), ("のに", Particle), ("ので", Particle),
    ("ながら", Particle), ("たり", Particle), ("だり", Particle), ("だけ", Particle),
    ("しか", Particle), ("ほど", Particle), ("くらい", Particle), ("ぐらい", Particle),
    ("など", Particle), ("なんて", Particle), ("って", Particle), ("とか", Particle),
    ("こそ", Particle), ("さえ", Particle), ("すら", Particle), ("ずつ", Particle),
    ("ばかり", Particle), ("について", Particle), ("として", Particle), ("にとって", Particle),
    ("によって", Particle), ("による", Particle), ("における", Particle), ("において", Particle),
    ("に関して", Particle), ("に関する", Particle), ("に対して", Particle), ("に対する", Particle),
    ("に基づいて", Particle), ("に従って", Particle), ("を使って", Particle),
    // auxiliaries
    ("ます", Aux), ("ました", Aux), ("ません", Aux), ("ませ", Aux), ("まし", Aux),
    ("ましょう", Aux), ("です", Aux), ("でした", Aux), ("でしょう", Aux), ("でし", Aux),
    ("だ", Aux), ("だった", Aux), ("だっ", Aux), ("だろう", Aux), ("た", Aux), ("ない", Aux),
    ("なかった", Aux), ("なかっ", Aux), ("なく", Aux), ("なければ", Aux), ("ぬ", Aux),
    ("ず", Aux), ("ん", Aux), ("れる", Aux), ("れ", Aux), ("られる", Aux), ("られ", Aux),
    ("せる", Aux), ("させる", Aux), ("させ", Aux), ("たい", Aux), ("たく", Aux),
    ("たかっ", Aux), ("う", Aux), ("よう", Aux), ("ような", Aux), ("ように", Aux),
    ("ようです", Aux), ("ようだ", Aux), ("らしい", Aux), ("べき", Aux), ("な", Aux),
    ("そうです", Aux), ("そうだ", Aux),
    // verbs (する, いる, ある, なる and friends)
    ("する", Verb), ("し", Verb), ("さ", Verb), ("せ", Verb), ("すれ", Verb), ("しろ", Verb),
    ("せよ", Verb), ("いる", Verb), ("い", Verb), ("ある", Verb), ("あり", Verb), ("あっ", Verb),
    ("あれ", Verb), ("なる", Verb), ("なり", Verb), ("なっ", Verb), ("なれ", Verb),
    ("できる", Verb), ("でき", Verb), ("いく", Verb), ("いき", Verb), ("いっ", Verb),
    ("くる", Verb), ("くれる", Verb), ("くれ", Verb), ("もらう", Verb), ("もらい", Verb),
    ("みる", Verb), ("おく", Verb), ("おき", Verb), ("しまう", Verb), ("しまい", Verb),
    ("ください", Verb), ("くださ", Verb), ("いただく", Verb), ("いただき", Verb),
    ("いたし", Verb), ("いたす", Verb), ("おり", Verb),
    // adjectives
    ("やすい", Adj), ("やすく", Adj), ("にくい", Adj), ("にくく", Adj), ("よい", Adj),
    ("いい", Adj), ("ほしい", Adj), ("すごい", Adj),
    // nouns
    ("こと", Noun), ("もの", Noun), ("ため", Noun), ("とき", Noun), ("ところ", Noun),
    ("これ", Noun), ("それ", Noun), ("あれら", Noun), ("どれ", Noun), ("ここ", Noun),
    ("そこ", Noun), ("あそこ", Noun), ("どこ", Noun), ("ほう", Noun), ("わけ", Noun),
    ("はず", Noun), ("うち", Noun), ("ほか", Noun), ("まま", Noun), ("なか", Noun),
    ("あと", Noun), ("まえ", Noun), ("うえ", Noun), ("たち", Noun),
    ("とおり", Noun), ("まとめ", Noun), ("おすすめ", Noun), ("つもり", Noun), ("すべて", Noun),
    ("いずれ", Noun), ("こちら", Noun), ("そちら", Noun), ("あちら", Noun), ("どちら", Noun),
    // conjunctions
    ("また", Conj), ("および", Conj), ("ならびに", Conj), ("または", Conj), ("あるいは", Conj),
    ("しかし", Conj), ("ただし", Conj), ("なお", Conj), ("そして", Conj), ("それから", Conj),
    ("つまり", Conj), ("すなわち", Conj), ("ところで", Conj), ("だから", Conj),
    ("したがって", Conj), ("ところが", Conj), ("それで", Conj), ("なぜなら", Conj),
    // adverbs
    ("たとえば", Other), ("とくに", Other), ("まず", Other), ("つぎに", Other),
    ("さらに", Other), ("すでに", Other), ("もっと", Other), ("とても", Other),
    ("かなり", Other), ("ぜひ", Other), ("たぶん", Other), ("おそらく", Other),
    ("ほぼ", Other), ("すぐに", Other), ("まだ", Other), ("もう", Other), ("やはり", Other),
];

/// Words that start with a kanji and continue into hiragana. Only consulted
/// when the word reaches past the end of the current kanji run.
#[rustfmt::skip]
static MIXED_WORDS: &[(&str, PartOfSpeech)] = &[
    ("例えば", Other), ("更に", Other), ("特に", Other), ("主に", Other), ("既に", Other),
    ("常に", Other), ("必ず", Other), ("及び", Conj), ("並びに", Conj), ("又は", Conj),
    ("或いは", Conj), ("但し", Conj), ("従って", Conj), ("下さい", Verb), ("致し", Verb),
    ("致します", Verb), ("頂き", Verb), ("出来る", Verb), ("出来", Verb),
    ("通り", Noun), ("使い方", Noun), ("書き方", Noun), ("考え方", Noun), ("読み方", Noun),
    ("進め方", Noun), ("流れ", Noun), ("扱い", Noun), ("違い", Noun), ("答え", Noun),
    ("考え", Noun), ("終わり", Noun), ("始まり", Noun), ("問い合わせ", Noun),
    ("組み合わせ", Noun), ("取り扱い", Noun), ("申し込み", Noun), ("手続き", Noun),
    ("見積もり", Noun), ("振り返り", Noun), ("割り当て", Noun), ("呼び出し", Noun),
    ("書き込み", Noun), ("読み込み", Noun), ("受け取り", Noun), ("切り替え", Noun),
    ("並び順", Noun), ("打ち合わせ", Noun), ("全て", Noun),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Hiragana,
    Katakana,
    Kanji,
    Latin,
    Space,
    Symbol,
}

fn script(ch: char) -> Script {
    match ch {
        '\u{3041}'..='\u{309F}' => Script::Hiragana,
        '\u{30FB}' => Script::Symbol,
        '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' | '\u{FF66}'..='\u{FF9F}' => {
            Script::Katakana
        }
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{3005}'
        | '\u{3006}' => Script::Kanji,
        '0'..='9'
        | 'a'..='z'
        | 'A'..='Z'
        | '_'
        | '\u{FF10}'..='\u{FF19}'
        | '\u{FF21}'..='\u{FF3A}'
        | '\u{FF41}'..='\u{FF5A}' => Script::Latin,
        c if c.is_whitespace() => Script::Space,
        _ => Script::Symbol,
    }
}

struct Token {
    surface: String,
    pos: PartOfSpeech,
    end: usize,
    /// Bare kanji run that may still take okurigana
    stem: bool,
}

fn longest<'w>(
    table: &'w [(&'w str, PartOfSpeech)],
    rest: &str,
) -> Option<(&'w str, PartOfSpeech)> {
    table
        .iter()
        .filter(|(word, _)| rest.starts_with(word))
        .max_by_key(|(word, _)| word.len())
        .map(|(word, pos)| (*word, *pos))
}

fn run_end(text: &str, start: usize, kind: Script) -> usize {
    text[start..]
        .char_indices()
        .find(|(_, ch)| script(*ch) != kind)
        .map(|(offset, _)| start + offset)
        .unwrap_or(text.len())
}

fn hiragana_pos(chunk: &str) -> PartOfSpeech {
    match chunk.chars().last() {
        Some('い') => Adj,
        Some(
            'う' | 'く' | 'ぐ' | 'す' | 'ず' | 'つ' | 'づ' | 'ぬ' | 'ふ' | 'ぶ' | 'ぷ' | 'む' | 'る',
        ) => Verb,
        _ => Other,
    }
}

fn okurigana_pos(chunk: &str) -> PartOfSpeech {
    if chunk.ends_with('い') {
        Adj
    } else {
        Verb
    }
}

/// Split `text` into morphemes.
pub fn segment(text: &str) -> Vec<Morpheme> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut pending: Option<usize> = None;
    let mut position = 0;

    while let Some(ch) = text[position..].chars().next() {
        let kind = script(ch);
        if kind != Script::Hiragana {
            flush(text, &mut tokens, &mut pending, position);
        }
        match kind {
            Script::Hiragana => match longest(FUNCTION_WORDS, &text[position..]) {
                Some((word, pos)) => {
                    flush(text, &mut tokens, &mut pending, position);
                    position += word.len();
                    tokens.push(Token {
                        surface: word.to_string(),
                        pos,
                        end: position,
                        stem: false,
                    });
                }
                None => {
                    pending.get_or_insert(position);
                    position += ch.len_utf8();
                }
            },
            Script::Kanji => {
                let end = run_end(text, position, Script::Kanji);
                position = kanji_run(text, position, end, &mut tokens);
            }
            Script::Katakana | Script::Latin => {
                let end = run_end(text, position, kind);
                tokens.push(Token {
                    surface: text[position..end].to_string(),
                    pos: Noun,
                    end,
                    stem: false,
                });
                position = end;
            }
            Script::Space => position += ch.len_utf8(),
            Script::Symbol => {
                position += ch.len_utf8();
                tokens.push(Token {
                    surface: ch.to_string(),
                    pos: Other,
                    end: position,
                    stem: false,
                });
            }
        }
    }
    flush(text, &mut tokens, &mut pending, position);

    tokens
        .into_iter()
        .map(|token| Morpheme::new(token.surface, token.pos))
        .collect()
}

/// Emit the kanji run `start..end`, splitting off a mixed word that begins
/// inside the run. Returns the position after what was consumed.
fn kanji_run(text: &str, start: usize, end: usize, tokens: &mut Vec<Token>) -> usize {
    let mixed = text[start..end].char_indices().find_map(|(offset, _)| {
        let at = start + offset;
        longest(MIXED_WORDS, &text[at..])
            .filter(|(word, _)| at + word.len() > end)
            .map(|found| (at, found))
    });

    match mixed {
        Some((at, (word, pos))) => {
            if at > start {
                tokens.push(Token {
                    surface: text[start..at].to_string(),
                    pos: Noun,
                    end: at,
                    stem: false,
                });
            }
            let after = at + word.len();
            tokens.push(Token {
                surface: word.to_string(),
                pos,
                end: after,
                stem: false,
            });
            after
        }
        None => {
            tokens.push(Token {
                surface: text[start..end].to_string(),
                pos: Noun,
                end,
                stem: true,
            });
            end
        }
    }
}

fn flush(text: &str, tokens: &mut Vec<Token>, pending: &mut Option<usize>, position: usize) {
    let Some(start) = pending.take() else {
        return;
    };
    let chunk = &text[start..position];
    if chunk.is_empty() {
        return;
    }
    match tokens.last_mut() {
        Some(stem) if stem.stem && stem.end == start => {
            stem.surface.push_str(chunk);
            stem.pos = okurigana_pos(chunk);
            stem.end = position;
            stem.stem = false;
        }
        _ => tokens.push(Token {
            surface: chunk.to_string(),
            pos: hiragana_pos(chunk),
            end: position,
            stem: false,
        }),
    }
}

/// In-process tokenizer backed by the built-in lexicon. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconTokenizer;

impl LexiconTokenizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tokenizer for LexiconTokenizer {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn tokenize(&self, text: &str) -> Result<Vec<Morpheme>, TokenizeError> {
        Ok(segment(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_pos(text: &str) -> PartOfSpeech {
        segment(text).last().expect("at least one morpheme").pos
    }

    fn surfaces(text: &str) -> Vec<String> {
        segment(text).into_iter().map(|m| m.surface).collect()
    }

    #[test]
    fn polite_predicates_end_in_auxiliaries() {
        assert_eq!(surfaces("実行します"), vec!["実行", "し", "ます"]);
        assert_eq!(last_pos("実行します"), Aux);
        assert_eq!(last_pos("理解しやすいです"), Aux);
    }

    #[test]
    fn compound_nouns_end_in_nouns() {
        assert_eq!(last_pos("使用方法"), Noun);
        assert_eq!(last_pos("検出される例"), Noun);
        assert_eq!(last_pos("API仕様"), Noun);
        assert_eq!(last_pos("コードの例"), Noun);
        assert_eq!(last_pos("以下の通り"), Noun);
        assert_eq!(last_pos("データの読み込み"), Noun);
    }

    #[test]
    fn hiragana_nouns_end_in_nouns() {
        assert_eq!(last_pos("まとめ"), Noun);
        assert_eq!(last_pos("おすすめ"), Noun);
        assert_eq!(surfaces("以下のとおり"), vec!["以下", "の", "とおり"]);
        assert_eq!(last_pos("手順は次のとおり"), Noun);
        assert_eq!(last_pos("まとめます"), Aux);
    }

    #[test]
    fn okurigana_attaches_to_the_stem() {
        assert_eq!(surfaces("結果を見る"), vec!["結果", "を", "見る"]);
        assert_eq!(last_pos("結果を見る"), Verb);
    }

    #[test]
    fn connectives_and_adverbs() {
        assert_eq!(last_pos("例えば"), Other);
        assert_eq!(last_pos("特徴として"), Particle);
        assert_eq!(last_pos("または"), Conj);
    }

    #[test]
    fn scripts_split_runs() {
        assert_eq!(surfaces("Rustでビルド"), vec!["Rust", "で", "ビルド"]);
        assert_eq!(surfaces("手順 1"), vec!["手順", "1"]);
    }

    #[tokio::test]
    async fn tokenizer_trait_wraps_segment() {
        let morphemes = LexiconTokenizer::new().tokenize("設定します").await.unwrap();
        assert_eq!(morphemes.len(), 3);
    }
}
