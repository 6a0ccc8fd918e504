//! Round-trip tests: parse then format should produce the same output.

mod common;

use common::{parse_ok, roundtrip, sexp};
use microscript_syntax::format;

// -----------------------------------------------------------
// Canonical sources survive unchanged.
// -----------------------------------------------------------

#[test]
fn roundtrip_local() {
    roundtrip("local x\nlocal y = 2\n");
}

#[test]
fn roundtrip_operators() {
    roundtrip("x = a + b * c - d / e % f\n");
    roundtrip("y = not a and b or c\n");
    roundtrip("z = a << 2 | b & c >> 1\n");
    roundtrip("w = a == b != (c < d)\n");
    roundtrip("p = -x ^ 2 ^ -y\n");
}

#[test]
fn roundtrip_compound_assignment() {
    roundtrip("a += 1\nb -= 2\nc *= 3\nd /= 4\ne %= 5\nf &= 6\ng |= 7\n");
}

#[test]
fn roundtrip_postfix_chain() {
    roundtrip("a.b[c](d, e).f = g\n");
}

#[test]
fn roundtrip_literals() {
    roundtrip("list = [1, 2.5, 0xff, .5, 1e10, 'single', \"double\", true, false]\n");
}

#[test]
fn roundtrip_triple_quoted() {
    roundtrip("js = \"\"\"\nfunction() { return \"x\"; }\n\"\"\"\n");
}

#[test]
fn roundtrip_string_escapes() {
    roundtrip("s = \"line\\nnext \\\"quoted\\\" \\\\ tab\\t\"\n");
    roundtrip("c = '\\x01'\n");
}

#[test]
fn roundtrip_while() {
    roundtrip("while x < 10\n\tx += 1\n\tif x == 5 then\n\t\tbreak\n\tend\nend\n");
}

#[test]
fn roundtrip_for_loops() {
    roundtrip("for i = 0 to 100 by 10\n\tprint(i)\nend\n");
    roundtrip("for item in inventory.items\n\tcontinue\nend\n");
}

#[test]
fn roundtrip_function_definition() {
    roundtrip("clamp = function(value, low = 0, high = 1)\n\treturn max(low, min(value, high))\nend\n");
}

#[test]
fn roundtrip_anonymous_function_argument() {
    roundtrip("items.sort(function(a, b)\n\treturn a.score - b.score\nend)\n");
}

#[test]
fn roundtrip_class() {
    roundtrip(
        "Enemy = class extends Sprite\n\
         \thealth = 100\n\
         \n\
         \tconstructor = function(x, y)\n\
         \t\tsuper(x, y)\n\
         \tend\n\
         \n\
         \thit = function(damage)\n\
         \t\tthis.health -= damage\n\
         \t\tif this.health <= 0 then\n\
         \t\t\tdelete this.world.enemies[this.id]\n\
         \t\tend\n\
         \tend\n\
         end\n",
    );
}

#[test]
fn roundtrip_object() {
    roundtrip("Config = object\n\twidth = 400\n\theight = 200\nend\n");
}

#[test]
fn roundtrip_scheduling() {
    roundtrip(
        "after 3 seconds do\n\tspawn()\nend\nevery 500 milliseconds do\n\ttick()\nend\nsleep 1 second\ndo\n\tload()\nend\n",
    );
}

#[test]
fn roundtrip_conditional_value() {
    roundtrip("local label = if score > 10 then\n\t\"high\"\nelse\n\t\"low\"\nend\n");
}

#[test]
fn roundtrip_new_expressions() {
    roundtrip("a = new Point\nb = new Point(1, 2)\nc = new Point()\n");
}

#[test]
fn roundtrip_bare_return() {
    roundtrip("stop = function()\n\treturn\nend\n");
}

// -----------------------------------------------------------
// Messy sources normalize, and the result is stable.
// -----------------------------------------------------------

fn assert_normalizes(input: &str, expected: &str) {
    let output = format(&parse_ok(input));
    assert_eq!(output, expected);
    assert_eq!(format(&parse_ok(&output)), output, "not idempotent");
    assert_eq!(sexp(input), sexp(&output), "tree changed");
}

#[test]
fn normalizes_whitespace_and_comments() {
    assert_normalizes(
        "  local   x=1 // one\n\n\n/* gap */  y =x+  2",
        "local x = 1\ny = x + 2\n",
    );
}

#[test]
fn normalizes_single_line_blocks() {
    assert_normalizes(
        "f = function(a) return a end g = function() end",
        "f = function(a)\n\treturn a\nend\n\ng = function()\nend\n",
    );
}

#[test]
fn normalizes_inline_conditional() {
    assert_normalizes(
        "local x = if a then 1 elsif b then 2 else 3 end",
        "local x = if a then\n\t1\nelsif b then\n\t2\nelse\n\t3\nend\n",
    );
}

#[test]
fn normalizes_call_spacing() {
    assert_normalizes("print ( 1 ,2 )", "print(1, 2)\n");
}

#[test]
fn normalizes_trailing_list_comma() {
    assert_normalizes("x = [1, 2, ]", "x = [1, 2]\n");
}

#[test]
fn normalizes_indentation() {
    assert_normalizes(
        "while true\n    if ready then\n        go()\n    end\nend",
        "while true\n\tif ready then\n\t\tgo()\n\tend\nend\n",
    );
}
