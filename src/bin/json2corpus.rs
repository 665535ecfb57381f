use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    qbank::apps::run_json2corpus(std::env::args().skip(1))
}
