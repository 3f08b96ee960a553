/*!
 * Tests for style lookup and fallback
 */

use ass2srt::script::parser::parse_str;
use ass2srt::script::{StyleResolver, parse_script, TextEncoding};

use crate::common::SAMPLE_ASS;

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

fn script_with_styles(styles: &[(&str, u8)]) -> String {
    let mut text = String::from("[Script Info]\nScriptType: v4.00+\n\n[V4+ Styles]\n");
    text.push_str(STYLE_FORMAT);
    text.push('\n');
    for (name, alignment) in styles {
        text.push_str(&format!(
            "Style: {},Arial,40,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,{},10,10,10,1\n",
            name, alignment
        ));
    }
    text.push_str("\n[Events]\nFormat: Start, End, Style, Text\n");
    text
}

#[test]
fn test_resolve_withKnownStyle_shouldReturnIt() {
    let script = parse_script(SAMPLE_ASS.as_bytes(), TextEncoding::Auto).unwrap();
    let resolver = StyleResolver::new(&script);

    assert_eq!(resolver.resolve("Sign").alignment, 8);
    assert_eq!(resolver.resolve("Default").alignment, 2);
}

#[test]
fn test_resolve_withMissingStyle_shouldFallBackToScriptDefault() {
    let script = parse_str(&script_with_styles(&[("Default", 5), ("Sign", 8)])).unwrap();
    let resolver = StyleResolver::new(&script);

    let style = resolver.resolve("DoesNotExist");
    assert_eq!(style.name, "Default");
    assert_eq!(style.alignment, 5);

    // Repeated misses keep returning the same fallback
    assert_eq!(resolver.resolve("DoesNotExist").alignment, 5);
}

#[test]
fn test_resolve_withoutDefaultStyle_shouldUseBuiltinDefault() {
    let script = parse_str(&script_with_styles(&[("Sign", 8)])).unwrap();
    let resolver = StyleResolver::new(&script);

    let style = resolver.resolve("Missing");
    assert_eq!(style.name, "Default");
    assert_eq!(style.alignment, 2);
}

#[test]
fn test_resolve_withDifferentCaseOrStar_shouldMatch() {
    let script = parse_str(&script_with_styles(&[("Default", 2), ("Sign", 8)])).unwrap();
    let resolver = StyleResolver::new(&script);

    assert_eq!(resolver.resolve("sign").alignment, 8);
    assert_eq!(resolver.resolve("*Sign").alignment, 8);
    assert_eq!(resolver.resolve(" Sign ").alignment, 8);
}

#[test]
fn test_resolve_withDuplicateStyles_shouldUseLastDefinition() {
    let script = parse_str(&script_with_styles(&[("Sign", 8), ("Sign", 9)])).unwrap();
    let resolver = StyleResolver::new(&script);
    assert_eq!(resolver.resolve("Sign").alignment, 9);
}

#[test]
fn test_context_for_shouldCarryAlignmentAndWrapStyle() {
    let mut text = script_with_styles(&[("Sign", 7)]);
    text = text.replace("ScriptType: v4.00+\n", "ScriptType: v4.00+\nWrapStyle: 2\n");
    text.push_str("Dialogue: 0:00:01.00,0:00:02.00,Sign,Hello\n");

    let script = parse_str(&text).unwrap();
    let resolver = StyleResolver::new(&script);
    let ctx = resolver.context_for(&script.events()[0]);

    assert_eq!(ctx.alignment, 7);
    assert_eq!(ctx.wrap_style, 2);
}
