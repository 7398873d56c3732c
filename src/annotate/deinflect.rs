//! Conjugated surface forms for Japanese dictionary forms.
//!
//! The dictionary tokenizer only knows lexicon lemmas, so common
//! conjugations are generated up front and mapped back to the lemma.
//! Coverage is deliberately shallow: plain/polite, negative, past,
//! te-form, progressive, volitional, conditional, potential, passive and
//! causative.

/// Ichidan endings appended to the stem (lemma minus `る`).
const ICHIDAN: &[&str] = &[
    "ない", "なかった", "ます", "ました", "ません", "ませんでした", "た", "て", "ている",
    "ていた", "ています", "てる", "られる", "させる", "よう", "れば", "ろ", "たい",
];

/// する endings. Also used for noun + する compounds.
const SURU: &[&str] = &[
    "し", "しない", "しなかった", "します", "しました", "しません", "した", "して", "している",
    "していた", "しています", "してる", "される", "させる", "しよう", "すれば", "しろ", "したい",
    "できる",
];

/// 来る in kana; the kanji spelling reuses the stem change with 来.
const KURU_KANA: &[&str] = &[
    "こない", "こなかった", "きます", "きました", "きません", "きた", "きて", "きている",
    "こられる", "こさせる", "こよう", "くれば", "こい", "きたい",
];

const KURU_KANJI: &[&str] = &[
    "来ない", "来なかった", "来ます", "来ました", "来ません", "来た", "来て", "来ている",
    "来られる", "来させる", "来よう", "来れば", "来い", "来たい",
];

/// i-adjective endings appended to the stem (lemma minus `い`).
const ADJECTIVE: &[&str] = &[
    "く", "くない", "くなかった", "かった", "くて", "ければ", "さ", "そう", "くなる",
];

/// Godan rows for a final u-row kana: (a, i, e, o, te, ta).
fn godan_row(last: char) -> Option<(char, char, char, char, &'static str, &'static str)> {
    Some(match last {
        'う' => ('わ', 'い', 'え', 'お', "って", "った"),
        'く' => ('か', 'き', 'け', 'こ', "いて", "いた"),
        'ぐ' => ('が', 'ぎ', 'げ', 'ご', "いで", "いだ"),
        'す' => ('さ', 'し', 'せ', 'そ', "して", "した"),
        'つ' => ('た', 'ち', 'て', 'と', "って", "った"),
        'ぬ' => ('な', 'に', 'ね', 'の', "んで", "んだ"),
        'ぶ' => ('ば', 'び', 'べ', 'ぼ', "んで", "んだ"),
        'む' => ('ま', 'み', 'め', 'も', "んで", "んだ"),
        'る' => ('ら', 'り', 'れ', 'ろ', "って", "った"),
        _ => return None,
    })
}

/// Kana that mark an ichidan verb when they precede the final `る`.
fn is_ichidan_vowel(c: char) -> bool {
    matches!(
        c,
        'い' | 'き' | 'ぎ' | 'し' | 'じ' | 'ち' | 'ぢ' | 'に' | 'ひ' | 'び' | 'ぴ' | 'み' | 'り'
            | 'え' | 'け' | 'げ' | 'せ' | 'ぜ' | 'て' | 'で' | 'ね' | 'へ' | 'べ' | 'ぺ' | 'め'
            | 'れ'
    )
}

fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{30ff}')
}

/// Conjugated forms of `lemma`, excluding the lemma itself.
///
/// Returns nothing for lemmas that do not look like a Japanese verb or
/// i-adjective.
pub fn inflections(lemma: &str) -> Vec<String> {
    let mut forms = Vec::new();

    if let Some(stem) = lemma.strip_suffix("する") {
        forms.extend(SURU.iter().map(|e| format!("{stem}{e}")));
        return forms;
    }
    if lemma == "くる" {
        forms.extend(KURU_KANA.iter().map(|s| s.to_string()));
        return forms;
    }
    if let Some(prefix) = lemma.strip_suffix("来る") {
        forms.extend(KURU_KANJI.iter().map(|e| format!("{prefix}{e}")));
        return forms;
    }

    let mut chars = lemma.chars().rev();
    let Some(last) = chars.next() else {
        return forms;
    };
    let Some(prev) = chars.next() else {
        return forms;
    };
    let stem = &lemma[..lemma.len() - last.len_utf8()];

    if last == 'い' {
        forms.extend(ADJECTIVE.iter().map(|e| format!("{stem}{e}")));
        return forms;
    }

    if last == 'る' {
        let ichidan = is_ichidan_vowel(prev);
        // Kanji + る is ambiguous (見る vs 切る); generate both.
        let godan = !ichidan || !is_kana(prev);
        if ichidan || !is_kana(prev) {
            forms.extend(ICHIDAN.iter().map(|e| format!("{stem}{e}")));
        }
        if godan {
            push_godan(&mut forms, stem, last);
        }
        return forms;
    }

    push_godan(&mut forms, stem, last);
    if lemma.ends_with("行く") || lemma.ends_with("いく") {
        forms.extend(["って", "った", "っている"].iter().map(|e| format!("{stem}{e}")));
    }
    forms
}

fn push_godan(forms: &mut Vec<String>, stem: &str, last: char) {
    let Some((a, i, e, o, te, ta)) = godan_row(last) else {
        return;
    };
    let a_stem = format!("{stem}{a}");
    let i_stem = format!("{stem}{i}");
    let e_stem = format!("{stem}{e}");

    for suffix in ["ない", "なかった", "れる", "せる"] {
        forms.push(format!("{a_stem}{suffix}"));
    }
    for suffix in ["ます", "ました", "ません", "ませんでした", "たい"] {
        forms.push(format!("{i_stem}{suffix}"));
    }
    forms.push(format!("{e_stem}ば"));
    forms.push(format!("{e_stem}る"));
    forms.push(format!("{stem}{o}う"));
    forms.push(format!("{stem}{te}"));
    forms.push(format!("{stem}{ta}"));
    forms.push(format!("{stem}{te}いる"));
    forms.push(format!("{stem}{te}いた"));
}
