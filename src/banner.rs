// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner(function: &str) {
    let banner = r#"
                 _  __        
  _____   ____ _| |/ _|_ __   
 / _ \ \ / / _` | | |_| '_ \  
|  __/\ V / (_| | |  _| | | | 
 \___| \_/ \__,_|_|_| |_| |_| 
"#;
    println!("{}", banner);
    println!("    Evaluation function: {}\n", function);
}
