use mdtabs::render::{ComrakRenderer, MarkdownRenderer};
use mdtabs::{convert, prepare_markdown};

fn main() {
    println!("=== Table Dialect Demo ===");

    let samples = [
        "||Name||Age||\n|ann|31|\n|bob|27|",
        "||Split||Header|\n|Row||\n|a|b|c|",
        "||||",
        "no tables here | just a pipe",
        "Euler: \\(e^{i\\pi} + 1 = 0\\)",
    ];

    let renderer = ComrakRenderer::default();
    for sample in samples {
        println!("\nInput:\n{}", sample);
        println!("Converted:\n{}", convert(sample));
        println!("Rendered:\n{}", renderer.render(&prepare_markdown(sample, true)));
    }
}
